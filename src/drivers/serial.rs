// =============================================================================
// SERIAL DRIVER - ZERO OVERHEAD
// =============================================================================
//
// Destino dos logs do kernel (`kinfo!`, `kerror!`, ...).
//
// BACKENDS:
// - i686 bare-metal: COM1 (0x3F8) via I/O ports, sem lock e sem IRQs.
// - testes de host: buffer por thread, lido com `take_captured()`.
// - outros hosts: descarta tudo.
//
// FUNÇÕES:
// - emit(byte)    : um byte
// - emit_str(s)   : string
// - emit_hex(v)   : u64 em hexadecimal compacto (0x2A, 0x0)
// - emit_dec(v)   : usize em decimal
// - emit_nl()     : CRLF
//
// Em single-CPU não há intercalação; o scheduler chama estas funções com
// interrupções desligadas.
//
// =============================================================================

#[cfg(all(target_arch = "x86", target_os = "none"))]
mod port {
    const COM1_DATA: u16 = 0x3F8;
    const COM1_STATUS: u16 = 0x3FD;
    const LSR_THR_EMPTY: u8 = 0x20;

    #[inline(always)]
    unsafe fn outb(port: u16, value: u8) {
        core::arch::asm!(
            "out dx, al",
            in("al") value,
            in("dx") port,
            options(nostack, nomem, preserves_flags)
        );
    }

    #[inline(always)]
    unsafe fn inb(port: u16) -> u8 {
        let value: u8;
        core::arch::asm!(
            "in al, dx",
            out("al") value,
            in("dx") port,
            options(nostack, nomem, preserves_flags)
        );
        value
    }

    /// 38400 baud, 8N1, FIFO habilitado.
    pub fn init() {
        unsafe {
            outb(COM1_DATA + 1, 0x00); // sem IRQs da UART
            outb(COM1_DATA + 3, 0x80); // DLAB
            outb(COM1_DATA, 0x03); // divisor lo
            outb(COM1_DATA + 1, 0x00); // divisor hi
            outb(COM1_DATA + 3, 0x03); // 8N1
            outb(COM1_DATA + 2, 0xC7); // FIFO, limpa, 14 bytes
            outb(COM1_DATA + 4, 0x0B);
        }
    }

    #[inline(always)]
    pub fn write_byte(byte: u8) {
        unsafe {
            while inb(COM1_STATUS) & LSR_THR_EMPTY == 0 {
                core::hint::spin_loop();
            }
            outb(COM1_DATA, byte);
        }
    }
}


#[cfg(not(any(test, all(target_arch = "x86", target_os = "none"))))]
mod port {
    pub fn init() {}

    #[inline(always)]
    pub fn write_byte(_byte: u8) {}
}

/// Inicializa a porta serial. Chamar uma vez no early-boot.
pub fn init() {
    port::init();
}

#[inline]
pub fn emit(byte: u8) {
    port::write_byte(byte);
}

#[inline(never)]
pub fn emit_str(s: &str) {
    for byte in s.bytes() {
        port::write_byte(byte);
    }
}

#[inline(never)]
pub fn emit_nl() {
    port::write_byte(b'\r');
    port::write_byte(b'\n');
}

/// Hexadecimal sem zeros à esquerda. Não usa `core::fmt`.
#[inline(never)]
pub fn emit_hex(value: u64) {
    emit(b'0');
    emit(b'x');

    let mut started = false;
    for shift in (0..16).rev() {
        let nibble = ((value >> (shift * 4)) & 0xF) as u8;
        if nibble != 0 || started || shift == 0 {
            started = true;
            emit(nibble_to_ascii(nibble));
        }
    }
}

/// Decimal, útil para contadores e PIDs.
#[inline(never)]
pub fn emit_dec(mut value: usize) {
    let mut buf = [0u8; 20];
    let mut pos = buf.len();

    if value == 0 {
        emit(b'0');
        return;
    }

    while value > 0 {
        pos -= 1;
        buf[pos] = b'0' + (value % 10) as u8;
        value /= 10;
    }

    for &digit in &buf[pos..] {
        emit(digit);
    }
}

#[inline(always)]
const fn nibble_to_ascii(n: u8) -> u8 {
    if n < 10 {
        b'0' + n
    } else {
        b'A' + (n - 10)
    }
}

/// Adaptador `fmt::Write`. Usado apenas fora dos caminhos quentes (panic).
pub struct SerialWriter;

impl core::fmt::Write for SerialWriter {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        emit_str(s);
        Ok(())
    }
}

/// Devolve (e limpa) tudo que esta thread de teste escreveu na serial.
#[cfg(test)]
pub fn take_captured() -> std::string::String {
    port::take()
}
