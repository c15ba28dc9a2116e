//! # Kernel Heap e Alocador Bruto
//!
//! O heap do kernel é um `linked_list_allocator::Heap` atrás de um
//! [`Spinlock`](crate::sync::Spinlock), registrado como `#[global_allocator]`
//! em bare-metal; ele sustenta os payloads de thread, stacks e buffers de FPU.
//!
//! ## Interrupções
//! O scheduler aloca e libera com interrupções mascaradas (reap, criação,
//! #NM). Se o lock do heap não mascarasse IRQs, um tick no meio de um
//! `Box::new` trocaria de thread com o heap travado e o próximo `dealloc` sob
//! o scheduler giraria para sempre. Por isso o heap é só de Ring 0: `cli` no
//! Ring 3 gera #GP, e threads de usuário não alocam.
//!
//! Stacks e buffers de FPU não passam por `Box`: o `StackManager` e o
//! scheduler pedem blocos com layout explícito através de [`RawAllocator`],
//! o que permite trocar o backend (testes usam um heap sobre um buffer local).

use super::{MmError, MmResult};
use crate::sync::Spinlock;
use core::alloc::{GlobalAlloc, Layout};
use core::ptr::{self, NonNull};
use linked_list_allocator::Heap;

/// Interface mínima de alocação bruta.
pub trait RawAllocator {
    /// Aloca um bloco com o layout pedido.
    fn allocate(&self, layout: Layout) -> MmResult<NonNull<u8>>;

    /// Libera um bloco.
    ///
    /// # Safety
    /// `ptr` deve ter sido devolvido por `allocate` deste alocador com o mesmo
    /// `layout`, e não pode ser usado depois.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

/// Backend padrão: o alocador global do kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct KernelHeap;

impl RawAllocator for KernelHeap {
    fn allocate(&self, layout: Layout) -> MmResult<NonNull<u8>> {
        if layout.size() == 0 {
            return Err(MmError::InvalidSize);
        }
        // SAFETY: layout com tamanho não-zero.
        let ptr = unsafe { alloc::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(MmError::OutOfMemory)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        alloc::alloc::dealloc(ptr.as_ptr(), layout);
    }
}

/// Heap com lock que mascara interrupções enquanto está travado.
pub struct KernelAllocator {
    heap: Spinlock<Heap>,
}

impl KernelAllocator {
    pub const fn empty() -> Self {
        Self {
            heap: Spinlock::new(Heap::empty()),
        }
    }

    /// Entrega `[start, start + size)` ao heap.
    ///
    /// # Safety
    /// A região deve estar mapeada, ser gravável, não ser usada por mais
    /// ninguém, e o heap ainda não pode ter sido inicializado.
    pub unsafe fn init(&self, start: usize, size: usize) -> MmResult<()> {
        if start == 0 || size == 0 {
            return Err(MmError::InvalidRegion);
        }
        self.with_heap(|heap| heap.init(start as *mut u8, size));
        Ok(())
    }

    /// Roda `f` com o heap travado e IRQs mascaradas; o estado anterior de IF
    /// volta quando `f` termina.
    pub fn with_heap<R>(&self, f: impl FnOnce(&mut Heap) -> R) -> R {
        let mut heap = self.heap.lock();
        f(&mut heap)
    }

    /// Bytes livres no heap.
    pub fn free(&self) -> usize {
        self.with_heap(|heap| heap.free())
    }
}

unsafe impl GlobalAlloc for KernelAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.with_heap(|heap| heap.allocate_first_fit(layout))
            .map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if let Some(ptr) = NonNull::new(ptr) {
            self.with_heap(|heap| heap.deallocate(ptr, layout));
        }
    }
}

impl RawAllocator for KernelAllocator {
    fn allocate(&self, layout: Layout) -> MmResult<NonNull<u8>> {
        if layout.size() == 0 {
            return Err(MmError::InvalidSize);
        }
        self.with_heap(|heap| heap.allocate_first_fit(layout))
            .map_err(|_| MmError::OutOfMemory)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        self.with_heap(|heap| heap.deallocate(ptr, layout));
    }
}

#[cfg(target_os = "none")]
#[global_allocator]
static ALLOCATOR: KernelAllocator = KernelAllocator::empty();

/// Entrega a região `[start, start + size)` ao heap do kernel.
///
/// # Safety
/// A região deve estar mapeada, ser gravável, não ser usada por mais ninguém,
/// e esta função deve ser chamada uma única vez, antes de qualquer alocação.
#[cfg(target_os = "none")]
pub unsafe fn init(start: usize, size: usize) -> MmResult<()> {
    if let Err(e) = ALLOCATOR.init(start, size) {
        crate::kerror!("(Heap) Região inválida. start=", start);
        return Err(e);
    }
    crate::kinfo!("(Heap) Inicializado. Tamanho=", size);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::{Cpu, CpuOps};

    #[repr(C, align(16))]
    struct Arena([u8; 8192]);

    fn heap_over(arena: &mut Arena) -> KernelAllocator {
        let heap = KernelAllocator::empty();
        unsafe { heap.init(arena.0.as_mut_ptr() as usize, arena.0.len()) }.unwrap();
        heap
    }

    #[test]
    fn kernel_allocator_allocates_and_recycles() {
        let mut arena = Box::new(Arena([0; 8192]));
        let heap = heap_over(&mut arena);

        let layout = Layout::from_size_align(4096, 16).unwrap();
        let a = heap.allocate(layout).unwrap();
        assert_eq!(a.as_ptr() as usize % 16, 0);

        // Não cabe um segundo bloco de 4 KiB junto com o primeiro + metadados
        let b = Layout::from_size_align(6000, 16).unwrap();
        assert_eq!(heap.allocate(b), Err(MmError::OutOfMemory));

        unsafe { heap.release(a, layout) };
        let again = heap.allocate(layout).unwrap();
        unsafe { heap.release(again, layout) };
    }

    #[test]
    fn empty_region_is_rejected() {
        let heap = KernelAllocator::empty();
        assert_eq!(unsafe { heap.init(0, 4096) }, Err(MmError::InvalidRegion));
        assert_eq!(unsafe { heap.init(0x1000, 0) }, Err(MmError::InvalidRegion));
    }

    #[test]
    fn heap_lock_masks_interrupts() {
        let mut arena = Box::new(Arena([0; 8192]));
        let heap = heap_over(&mut arena);

        Cpu::enable_interrupts();
        let masked = heap.with_heap(|_| !Cpu::are_interrupts_enabled());
        assert!(masked);
        assert!(Cpu::are_interrupts_enabled());

        let layout = Layout::from_size_align(64, 8).unwrap();
        let ptr = unsafe { GlobalAlloc::alloc(&heap, layout) };
        assert!(!ptr.is_null());
        assert!(Cpu::are_interrupts_enabled());
        unsafe { GlobalAlloc::dealloc(&heap, ptr, layout) };
        assert!(Cpu::are_interrupts_enabled());
    }

    // O reap roda sob o lock do scheduler: liberar não pode reabilitar IRQs.
    #[test]
    fn release_under_masked_interrupts_keeps_them_masked() {
        let mut arena = Box::new(Arena([0; 8192]));
        let heap = heap_over(&mut arena);
        let layout = Layout::from_size_align(512, 16).unwrap();
        let ptr = heap.allocate(layout).unwrap();
        let before = heap.free();

        Cpu::disable_interrupts();
        unsafe { heap.release(ptr, layout) };
        let still_masked = !Cpu::are_interrupts_enabled();
        Cpu::enable_interrupts();

        assert!(still_masked);
        assert!(heap.free() > before);
    }

    #[test]
    fn zero_sized_requests_are_rejected() {
        let layout = Layout::from_size_align(0, 1).unwrap();
        assert_eq!(KernelHeap.allocate(layout), Err(MmError::InvalidSize));
    }

    #[test]
    fn kernel_heap_roundtrip() {
        let layout = Layout::from_size_align(512, 16).unwrap();
        let ptr = KernelHeap.allocate(layout).unwrap();
        assert_eq!(ptr.as_ptr() as usize % 16, 0);
        unsafe { KernelHeap.release(ptr, layout) };
    }
}
