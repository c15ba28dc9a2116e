//! Acesso a portas de I/O (IN/OUT).

use core::arch::asm;

/// # Safety
/// Escrever em uma porta arbitrária pode reprogramar hardware.
#[inline]
pub unsafe fn outb(port: u16, value: u8) {
    asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags));
}

/// # Safety
/// Algumas portas têm efeitos colaterais na leitura.
#[inline]
pub unsafe fn inb(port: u16) -> u8 {
    let value: u8;
    asm!("in al, dx", out("al") value, in("dx") port, options(nomem, nostack, preserves_flags));
    value
}
