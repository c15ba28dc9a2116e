//! Panic Handler - Tratamento de pânicos do kernel
//!
//! Implementação do panic handler obrigatório para kernels no_std.
//! Só existe em bare-metal; builds hospedados usam o handler da std.

use crate::arch::{Cpu, CpuOps};
use crate::drivers::serial::SerialWriter;
use ::core::fmt::Write;
use ::core::panic::PanicInfo;

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    Cpu::disable_interrupts();

    crate::kerror!("*** KERNEL PANIC ***");
    if let Some(location) = info.location() {
        crate::kerror!(location.file());
        crate::kerror!("Linha=", location.line());
    }
    let _ = write!(SerialWriter, "{}", info.message());
    crate::knl!();

    Cpu::hang()
}
