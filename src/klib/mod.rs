//! Kernel Library (KLib).
//!
//! Utilitários agnósticos de hardware para uso interno do kernel.

pub mod align;
pub mod test_framework;

pub use align::{align_down, align_up, is_aligned};
