//! # Stack Manager
//!
//! Alocação, destruição e contabilidade das stacks de threads.
//!
//! - Toda stack tem exatamente um dono (o bloco de controle da thread); por
//!   isso [`Stack`] não é `Clone` e `destroy` consome o valor.
//! - O topo é `align_down(base + size, STACK_ALIGN)`, logo
//!   `base <= top <= base + size`.
//! - O uso é medido pelo stack pointer salvo a cada passagem do scheduler.

use super::config::{STACK_ALIGN, STACK_SAFETY_PERCENT};
use super::error::{SchedError, SchedResult};
use crate::klib::align_down;
use crate::mm::RawAllocator;
use core::alloc::Layout;
use core::ptr::NonNull;

/// O que fazer quando o uso de stack de um bloco passa do limite seguro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Loga e marca o bloco (`ControlBlock::overflow`)
    Warn,
    /// Além de logar, termina o bloco (exceto a idle)
    Terminate,
}

/// Stack de uma thread.
#[derive(Debug, PartialEq, Eq)]
pub struct Stack {
    base: usize,
    size: usize,
    top: usize,
    /// Último uso medido (bytes entre o topo e o stack pointer).
    usage: usize,
}

impl Stack {
    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn top(&self) -> usize {
        self.top
    }

    #[inline]
    pub fn cached_usage(&self) -> usize {
        self.usage
    }

    /// `base <= addr <= top`.
    #[inline]
    pub fn contains(&self, addr: usize) -> bool {
        addr >= self.base && addr <= self.top
    }

    fn is_valid(&self) -> bool {
        self.base != 0 && self.size > 0
    }

    fn layout(&self) -> SchedResult<Layout> {
        Layout::from_size_align(self.size, STACK_ALIGN).map_err(|_| SchedError::InvalidStack)
    }
}

/// Gerenciador de stacks sobre um alocador bruto.
pub struct StackManager<A: RawAllocator> {
    allocator: A,
    total_allocated: usize,
    total_usage: usize,
}

impl<A: RawAllocator> StackManager<A> {
    pub const fn new(allocator: A) -> Self {
        Self {
            allocator,
            total_allocated: 0,
            total_usage: 0,
        }
    }

    /// Acesso ao alocador (também usado para os buffers de FPU).
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Aloca uma stack de `size` bytes.
    pub fn allocate(&mut self, size: usize) -> SchedResult<Stack> {
        if size == 0 {
            crate::kerror!("(Stack) Tamanho zero");
            return Err(SchedError::InvalidStackSize);
        }

        let layout =
            Layout::from_size_align(size, STACK_ALIGN).map_err(|_| SchedError::InvalidStackSize)?;

        let base = match self.allocator.allocate(layout) {
            Ok(ptr) => ptr.as_ptr() as usize,
            Err(_) => {
                crate::kerror!("(Stack) Sem memória para stack. size=", size);
                return Err(SchedError::StackAllocFailed);
            }
        };

        let top = align_down(base + size, STACK_ALIGN);
        self.total_allocated += size;

        crate::ktrace!("(Stack) Alocada. top=", top);
        Ok(Stack {
            base,
            size,
            top,
            usage: 0,
        })
    }

    /// Libera a stack e desconta suas parcelas dos totais.
    /// Uma stack inválida é rejeitada sem efeito.
    pub fn destroy(&mut self, stack: Stack) -> SchedResult<()> {
        if !stack.is_valid() {
            crate::kerror!("(Stack) Tentativa de destruir stack inválida");
            return Err(SchedError::InvalidStack);
        }
        let layout = stack.layout()?;
        let ptr = NonNull::new(stack.base as *mut u8).ok_or(SchedError::InvalidStack)?;

        self.total_allocated = self.total_allocated.saturating_sub(stack.size);
        self.total_usage = self.total_usage.saturating_sub(stack.usage);

        // SAFETY: `base`/`layout` vieram de `allocate` deste alocador e a stack
        // foi consumida, então ninguém mais a referencia.
        unsafe { self.allocator.release(ptr, layout) };

        crate::ktrace!("(Stack) Destruída. base=", stack.base);
        Ok(())
    }

    /// Uso atual dado o stack pointer `sp`: `top - sp`, ou 0 fora de `[base, top]`.
    /// Atualiza o uso em cache da stack e o total global.
    pub fn usage(&mut self, stack: &mut Stack, sp: usize) -> usize {
        if !stack.is_valid() || !stack.contains(sp) {
            return 0;
        }
        let usage = stack.top - sp;
        self.total_usage = self.total_usage - stack.usage + usage;
        stack.usage = usage;
        usage
    }

    /// `false` se `sp` está fora da stack ou o uso chegou a 90% do tamanho.
    pub fn is_safe(&mut self, stack: &mut Stack, sp: usize) -> bool {
        if !stack.is_valid() || !stack.contains(sp) {
            return false;
        }
        let usage = self.usage(stack, sp);
        usage * 100 < stack.size * STACK_SAFETY_PERCENT
    }

    pub fn total_allocated(&self) -> usize {
        self.total_allocated
    }

    pub fn total_usage(&self) -> usize {
        self.total_usage
    }
}
