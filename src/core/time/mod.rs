//! Tempo: contador de ticks e relógio monotônico.

pub mod jiffies;

pub use jiffies::{now_ms, ticks};
