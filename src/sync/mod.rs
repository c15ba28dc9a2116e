//! # Synchronization Primitives
//!
//! ```text
//! Spinlock   → estado do kernel, interrupções mascaradas (Ring 0)
//! Mutex      → exclusão entre threads; contenção cede a CPU (Ring 0 e 3)
//! ```
//!
//! ## Regras
//!
//! - **Spinlock**: seções curtas; nunca chamar o scheduler com um retido
//! - **Mutex**: nunca retido através de `sleep`/`exit_thread`

pub mod mutex;
pub mod spinlock;


pub use mutex::{Mutex, MutexGuard, RawMutex};
pub use spinlock::{Spinlock, SpinlockGuard};
