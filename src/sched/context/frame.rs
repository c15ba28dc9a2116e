//! Registro de contexto de execução (i686).
//!
//! Snapshot completo dos registradores como depositado pelos stubs de
//! entrada (`arch::x86::entry`). É a única unidade de estado transferida
//! entre "rodando" e "suspenso"; cada bloco de controle embute um por valor.
//!
//! O layout é fixo e verificado em tempo de compilação. Qualquer mudança
//! exige incrementar [`CONTEXT_LAYOUT_VERSION`] e ajustar o assembly.

use crate::arch::selectors::SegmentSelector;
use bitflags::bitflags;
use core::mem::{offset_of, size_of};

/// Versão do layout binário de [`ExecutionContext`].
pub const CONTEXT_LAYOUT_VERSION: u32 = 1;

bitflags! {
    /// Bits de EFLAGS relevantes para o scheduler.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EFlags: u32 {
        const CARRY = 1 << 0;
        /// Bit 1 é sempre 1 em hardware.
        const RESERVED_1 = 1 << 1;
        const ZERO = 1 << 6;
        const SIGN = 1 << 7;
        const TRAP = 1 << 8;
        /// IF: interrupções mascaráveis habilitadas.
        const INTERRUPT = 1 << 9;
        const DIRECTION = 1 << 10;
        const OVERFLOW = 1 << 11;
    }
}

impl EFlags {
    /// EFLAGS inicial de toda thread nova: IF | bit reservado (0x202).
    pub const INITIAL: EFlags = EFlags::INTERRUPT.union(EFlags::RESERVED_1);
}

/// Contexto salvo. Ordem dos GPRs = ordem de `PUSHA` em memória.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionContext {
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    pub esp: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,

    pub cs: u16,
    pub ds: u16,
    pub es: u16,
    pub fs: u16,
    pub gs: u16,
    pub ss: u16,

    pub eip: u32,
    pub eflags: u32,
    pub error_code: u32,
}

const _: () = {
    assert!(offset_of!(ExecutionContext, edi) == 0);
    assert!(offset_of!(ExecutionContext, esi) == 4);
    assert!(offset_of!(ExecutionContext, ebp) == 8);
    assert!(offset_of!(ExecutionContext, esp) == 12);
    assert!(offset_of!(ExecutionContext, ebx) == 16);
    assert!(offset_of!(ExecutionContext, edx) == 20);
    assert!(offset_of!(ExecutionContext, ecx) == 24);
    assert!(offset_of!(ExecutionContext, eax) == 28);
    assert!(offset_of!(ExecutionContext, cs) == 32);
    assert!(offset_of!(ExecutionContext, ds) == 34);
    assert!(offset_of!(ExecutionContext, es) == 36);
    assert!(offset_of!(ExecutionContext, fs) == 38);
    assert!(offset_of!(ExecutionContext, gs) == 40);
    assert!(offset_of!(ExecutionContext, ss) == 42);
    assert!(offset_of!(ExecutionContext, eip) == 44);
    assert!(offset_of!(ExecutionContext, eflags) == 48);
    assert!(offset_of!(ExecutionContext, error_code) == 52);
    assert!(size_of::<ExecutionContext>() == 56);
};

impl ExecutionContext {
    /// Contexto todo zerado.
    pub const ZERO: ExecutionContext = ExecutionContext {
        edi: 0,
        esi: 0,
        ebp: 0,
        esp: 0,
        ebx: 0,
        edx: 0,
        ecx: 0,
        eax: 0,
        cs: 0,
        ds: 0,
        es: 0,
        fs: 0,
        gs: 0,
        ss: 0,
        eip: 0,
        eflags: 0,
        error_code: 0,
    };

    /// Contexto inicial de uma thread: começa em `entry` com a stack em `stack_top`,
    /// segmentos `code`/`data` e EFLAGS = [`EFlags::INITIAL`].
    pub const fn new_thread(
        entry: u32,
        stack_top: u32,
        code: SegmentSelector,
        data: SegmentSelector,
    ) -> Self {
        let data = data.as_u16();
        ExecutionContext {
            esp: stack_top,
            ebp: stack_top,
            cs: code.as_u16(),
            ds: data,
            es: data,
            fs: data,
            gs: data,
            ss: data,
            eip: entry,
            eflags: EFlags::INITIAL.bits(),
            ..Self::ZERO
        }
    }

    /// Reinterpreta o registro deixado pelo stub de entrada.
    ///
    /// Esta é a única conversão de memória crua para contexto no kernel.
    ///
    /// # Safety
    /// `ptr` deve apontar para um registro completo, alinhado a 4 bytes e
    /// exclusivo durante o tempo de vida retornado (o stub garante isso com
    /// interrupções mascaradas).
    pub unsafe fn from_raw<'a>(ptr: *mut ExecutionContext) -> &'a mut ExecutionContext {
        &mut *ptr
    }

    #[inline]
    pub fn flags(&self) -> EFlags {
        EFlags::from_bits_retain(self.eflags)
    }

    /// RPL do seletor de código: 0 = kernel, 3 = usuário.
    #[inline]
    pub fn privilege_level(&self) -> u16 {
        self.cs & 0b11
    }
}
