//! Idle: bloco de prioridade 0 escolhido só quando ninguém mais está pronto.
//!
//! Roda em Ring 0 com interrupções habilitadas; cada `hlt` termina no próximo
//! IRQ, e o tick do timer acaba devolvendo a CPU a quem estiver pronto.

use crate::arch::{Cpu, CpuOps};

pub extern "C" fn idle_task_entry() -> ! {
    crate::kinfo!("(Idle) Idle iniciada");

    let mut cycles: u64 = 0;
    loop {
        Cpu::enable_interrupts();
        Cpu::halt();

        cycles = cycles.wrapping_add(1);
        if cycles % 1000 == 0 {
            crate::kdebug!("(Idle) Ciclos:", cycles);
        }
    }
}
