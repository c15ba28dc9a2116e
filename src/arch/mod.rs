//! # Hardware Abstraction Layer (HAL)
//!
//! O módulo `arch` é a **única** ponte entre a lógica do scheduler e o hardware.
//! Toda interação com registradores, instruções privilegiadas e stubs de
//! interrupção passa por aqui.
//!
//! ## Seleção de Plataforma
//! - `target_arch = "x86"` + `target_os = "none"`: implementação real
//!   (i686, modo protegido 32-bit).
//! - Qualquer outro alvo: CPU simulada (`hosted`), usada pelos testes de host.
//!   Ela mantém a flag de interrupção em memória e nunca troca de stack.
//!
//! O resto do kernel importa apenas `crate::arch::Cpu` e `crate::arch::platform`.

pub mod selectors;
pub mod traits;

#[cfg(all(target_arch = "x86", target_os = "none"))]
pub mod x86;

#[cfg(all(target_arch = "x86", target_os = "none"))]
pub use x86 as platform;

#[cfg(not(all(target_arch = "x86", target_os = "none")))]
pub mod hosted;

#[cfg(not(all(target_arch = "x86", target_os = "none")))]
pub use hosted as platform;

// Re-exports globais para o kernel usar
pub use platform::Cpu;
pub use traits::*;
