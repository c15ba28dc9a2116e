//! Core Module
//!
//! Serviços centrais independentes de arquitetura: logging, tempo e
//! self-tests.

pub mod logging;
pub mod time;

#[cfg(feature = "self_test")]
pub mod selftest;
