//! Apoio aos testes de host do scheduler.

use crate::mm::{MmError, MmResult, RawAllocator};
use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::NonNull;

/// Alocador de endereços fictícios abaixo de 4 GiB.
///
/// Os registradores do contexto são de 32 bits; com endereços reais de um host
/// 64-bit o ESP salvo não caberia. O scheduler nunca lê nem escreve a memória
/// das stacks, então endereços que não são desreferenciados bastam.
pub struct FakeArena {
    next: Cell<usize>,
    live: Cell<usize>,
    budget: Cell<Option<usize>>,
}

impl FakeArena {
    pub const BASE: usize = 0x0010_0000;

    pub fn new() -> Self {
        Self {
            next: Cell::new(Self::BASE),
            live: Cell::new(0),
            budget: Cell::new(None),
        }
    }

    /// Falha depois de `n` alocações bem-sucedidas.
    pub fn with_budget(n: usize) -> Self {
        let arena = Self::new();
        arena.budget.set(Some(n));
        arena
    }

    /// Blocos ainda não liberados.
    pub fn live(&self) -> usize {
        self.live.get()
    }
}

impl RawAllocator for FakeArena {
    fn allocate(&self, layout: Layout) -> MmResult<NonNull<u8>> {
        if let Some(left) = self.budget.get() {
            if left == 0 {
                return Err(MmError::OutOfMemory);
            }
            self.budget.set(Some(left - 1));
        }
        let align = layout.align();
        let base = (self.next.get() + align - 1) & !(align - 1);
        self.next.set(base + layout.size());
        self.live.set(self.live.get() + 1);
        NonNull::new(base as *mut u8).ok_or(MmError::OutOfMemory)
    }

    unsafe fn release(&self, _ptr: NonNull<u8>, _layout: Layout) {
        self.live.set(self.live.get() - 1);
    }
}

/// Serializa os testes que tocam os últimos slots da tabela (contadores de
/// mutex globais): a tabela cheia e a auditoria de locks.
static HIGH_SLOTS: spin::Mutex<()> = spin::Mutex::new(());

pub fn high_slots() -> spin::MutexGuard<'static, ()> {
    HIGH_SLOTS.lock()
}

/// Serializa os testes que dirigem o scheduler global de `sched`.
static GLOBAL_SCHEDULER: spin::Mutex<()> = spin::Mutex::new(());

pub fn global_scheduler() -> spin::MutexGuard<'static, ()> {
    GLOBAL_SCHEDULER.lock()
}
