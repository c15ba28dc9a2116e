//! Área de salvamento FXSAVE (lazy FPU).
//!
//! Alocada sob demanda na primeira exceção #NM do bloco e liberada junto com
//! a stack. `saved` indica se o conteúdo veio de um FXSAVE (só então pode ser
//! restaurado com FXRSTOR).

use crate::mm::RawAllocator;
use crate::sched::config::{FPU_STATE_ALIGN, FPU_STATE_SIZE};
use crate::sched::error::{SchedError, SchedResult};
use core::alloc::Layout;
use core::ptr::NonNull;

#[derive(Debug)]
pub struct FpuArea {
    ptr: NonNull<u8>,
    saved: bool,
}

// SAFETY: a área pertence a um único bloco de controle e só é acessada com o
// scheduler travado.
unsafe impl Send for FpuArea {}

impl FpuArea {
    fn layout() -> Layout {
        // SAFETY: constantes válidas (512, potência de dois).
        unsafe { Layout::from_size_align_unchecked(FPU_STATE_SIZE, FPU_STATE_ALIGN) }
    }

    pub fn allocate<A: RawAllocator>(allocator: &A) -> SchedResult<Self> {
        match allocator.allocate(Self::layout()) {
            Ok(ptr) => Ok(Self { ptr, saved: false }),
            Err(_) => {
                crate::kerror!("(FPU) Sem memória para área FXSAVE");
                Err(SchedError::FpuAllocFailed)
            }
        }
    }

    pub fn release<A: RawAllocator>(self, allocator: &A) {
        // SAFETY: `ptr` veio de `allocate` com o mesmo layout; `self` é consumido.
        unsafe { allocator.release(self.ptr, Self::layout()) };
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    #[inline]
    pub fn mark_saved(&mut self) {
        self.saved = true;
    }
}
