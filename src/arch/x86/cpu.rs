//! Implementação i686 das operações de CPU (HAL).
//!
//! Usa Assembly inline para controle de interrupções, FPU e o vetor de yield.
//!
//! # Segurança
//! Assume modo protegido 32-bit e nível de privilégio de kernel (Ring 0).

use crate::arch::traits::cpu::CpuOps;
use crate::sched::context::EFlags;
use core::arch::asm;

/// Vetor de software usado para yield voluntário.
/// Deve ser instalado na IDT apontando para `sched_yield_stub`.
pub const YIELD_VECTOR: u8 = 0x81;

/// Bit TS (Task Switched) do CR0.
const CR0_TS: u32 = 1 << 3;

pub struct X86Cpu;

impl X86Cpu {
    /// Lê EFLAGS via PUSHFD/POP.
    #[inline]
    pub fn eflags() -> EFlags {
        let raw: u32;
        unsafe {
            asm!("pushfd", "pop {}", out(reg) raw, options(nomem, preserves_flags));
        }
        EFlags::from_bits_retain(raw)
    }

    #[inline]
    fn read_cr0() -> u32 {
        let cr0: u32;
        unsafe {
            asm!("mov {}, cr0", out(reg) cr0, options(nomem, nostack, preserves_flags));
        }
        cr0
    }

    #[inline]
    fn write_cr0(cr0: u32) {
        unsafe {
            asm!("mov cr0, {}", in(reg) cr0, options(nomem, nostack, preserves_flags));
        }
    }
}

impl CpuOps for X86Cpu {
    #[inline]
    fn halt() {
        unsafe {
            asm!("hlt", options(nomem, nostack, preserves_flags));
        }
    }

    #[inline]
    fn disable_interrupts() {
        unsafe {
            asm!("cli", options(nomem, nostack, preserves_flags));
        }
    }

    #[inline]
    fn enable_interrupts() {
        unsafe {
            asm!("sti", options(nomem, nostack, preserves_flags));
        }
    }

    #[inline]
    fn are_interrupts_enabled() -> bool {
        Self::eflags().contains(EFlags::INTERRUPT)
    }

    #[inline]
    fn relax() {
        unsafe {
            asm!("pause", options(nomem, nostack, preserves_flags));
        }
    }

    /// Dispara `int 0x81`. O stub salva o contexto inteiro e chama o scheduler;
    /// quando esta thread for escolhida de novo, o `iretd` volta para cá.
    #[inline]
    fn raise_request(number: u32, arg: u32) {
        unsafe {
            asm!("int 0x81", inout("eax") number => _, inout("ecx") arg => _);
        }
    }

    #[inline]
    fn fpu_set_trap() {
        Self::write_cr0(Self::read_cr0() | CR0_TS);
    }

    #[inline]
    fn fpu_clear_trap() {
        unsafe {
            asm!("clts", options(nomem, nostack, preserves_flags));
        }
    }

    #[inline]
    unsafe fn fpu_save(area: *mut u8) {
        asm!("fxsave [{}]", in(reg) area, options(nostack, preserves_flags));
    }

    #[inline]
    unsafe fn fpu_restore(area: *const u8) {
        asm!("fxrstor [{}]", in(reg) area, options(nostack, preserves_flags));
    }

    #[inline]
    fn fpu_init() {
        unsafe {
            asm!("fninit", options(nomem, nostack, preserves_flags));
        }
    }
}
