//! CPU simulada para builds hospedados (testes de host).
//!
//! - A flag de interrupção vive em memória (por thread nos testes, para que
//!   testes paralelos não interfiram entre si).
//! - `restore` não troca de stack: apenas registra o contexto escolhido.
//! - Operações de FPU são no-ops.

use crate::arch::traits::cpu::CpuOps;
use crate::sched::context::ExecutionContext;


#[cfg(not(test))]
mod state {
    use core::sync::atomic::{AtomicBool, Ordering};

    static IF: AtomicBool = AtomicBool::new(true);

    pub fn interrupts() -> bool {
        IF.load(Ordering::Relaxed)
    }

    pub fn set_interrupts(on: bool) {
        IF.store(on, Ordering::Relaxed);
    }

    pub fn record_restore(_addr: usize) {}

    pub fn record_request() {
        core::hint::spin_loop();
    }
}

pub struct HostedCpu;

pub use HostedCpu as Cpu;

impl CpuOps for HostedCpu {
    fn halt() {
        core::hint::spin_loop();
    }

    fn disable_interrupts() {
        state::set_interrupts(false);
    }

    fn enable_interrupts() {
        state::set_interrupts(true);
    }

    fn are_interrupts_enabled() -> bool {
        state::interrupts()
    }

    /// Sem vetor de interrupção: o pedido só é contado.
    fn raise_request(_number: u32, _arg: u32) {
        state::record_request();
    }

    fn fpu_set_trap() {}

    fn fpu_clear_trap() {}

    unsafe fn fpu_save(_area: *mut u8) {}

    unsafe fn fpu_restore(_area: *const u8) {}

    fn fpu_init() {}
}

/// Registra o contexto que seria restaurado e retorna com interrupções
/// habilitadas, como o IRETD com o EFLAGS inicial.
///
/// # Safety
/// Mesmo contrato da versão x86; aqui o ponteiro nem é lido.
pub unsafe fn restore(ctx: *const ExecutionContext) {
    state::record_restore(ctx as usize);
    state::set_interrupts(true);
}

pub fn install_interrupt_stack() {}

fn never_started() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

/// Sem trampolim real: um endereço qualquer, nunca executado.
pub fn trampoline_address() -> u32 {
    never_started as usize as u32
}

/// Último contexto passado a `restore` nesta thread de teste.
#[cfg(test)]
pub fn last_restore() -> usize {
    state::last_restore()
}

/// Quantos pedidos (`raise_request`) esta thread de teste fez.
#[cfg(test)]
pub fn requests() -> usize {
    state::requests()
}
