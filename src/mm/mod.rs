//! # Memory Management (subconjunto do núcleo de execução)
//!
//! Apenas o necessário para processos e threads: o heap do kernel e a
//! interface de alocação bruta usada por stacks e buffers de FPU.
//! Paginação e espaços de endereçamento ficam fora deste crate.

pub mod error;
pub mod heap;

pub use error::{MmError, MmResult};
pub use heap::{KernelAllocator, KernelHeap, RawAllocator};
