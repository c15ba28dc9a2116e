//! Modelo de processos e threads.

pub mod entity;
pub mod fpu;
pub mod state;
pub mod thread;

pub use entity::{ControlBlock, Pid};
pub use fpu::FpuArea;
pub use state::{Privilege, ProcessState, ThreadState};
pub use thread::{Thread, ThreadEntry};
