//! # Drivers mínimos do núcleo de execução
//!
//! | Driver   | Arquivo          | Uso |
//! |----------|------------------|-----|
//! | Serial   | `serial.rs`      | Destino dos logs do kernel |
//! | PIC      | `pic.rs`         | EOI do IRQ 0 |
//! | Timer    | `timer/pit.rs`   | PIT 8254, tick do scheduler |

pub mod pic; // 8259 PIC - EOI
pub mod serial; // UART 16550 - Logs
pub mod timer; // PIT 8254 - Timer do sistema
