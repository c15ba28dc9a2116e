//! Driver mínimo do 8259 PIC.
//!
//! O remapeamento (IRQs em 32-47) é feito pela camada de interrupções no boot;
//! o núcleo de execução só precisa confirmar o IRQ0 do timer.

/// Vetor base do PIC mestre após o remapeamento.
pub const PIC1_OFFSET: u8 = 32;
/// Vetor base do PIC escravo após o remapeamento.
pub const PIC2_OFFSET: u8 = 40;

#[cfg(all(target_arch = "x86", target_os = "none"))]
const PIC1_CMD: u16 = 0x20;
#[cfg(all(target_arch = "x86", target_os = "none"))]
const PIC2_CMD: u16 = 0xA0;
#[cfg(all(target_arch = "x86", target_os = "none"))]
const PIC_EOI: u8 = 0x20;

/// Envia "End of Interrupt" para a IRQ `irq` (0-15).
/// Deve ser chamado antes de qualquer troca de contexto no handler.
#[cfg(all(target_arch = "x86", target_os = "none"))]
pub fn send_eoi(irq: u8) {
    use crate::arch::x86::port::outb;

    // SAFETY: portas de comando do 8259, apenas o comando EOI.
    unsafe {
        if irq >= 8 {
            outb(PIC2_CMD, PIC_EOI);
        }
        outb(PIC1_CMD, PIC_EOI);
    }
}

#[cfg(not(all(target_arch = "x86", target_os = "none")))]
pub fn send_eoi(_irq: u8) {}
