//! Plataforma i686 (modo protegido 32-bit, single-CPU).

pub mod cpu;
pub mod entry;
pub mod port;

pub use cpu::X86Cpu as Cpu;
pub use entry::{install_interrupt_stack, restore, trampoline_address};
