//! Núcleo do scheduler: decisão (`scheduler`), sono, idle, entrada de threads
//! e dump de depuração.

pub mod debug;
pub mod entry;
pub mod idle;
pub mod scheduler;
pub mod sleep;

pub use idle::idle_task_entry;
pub use scheduler::{Decision, Scheduler};
