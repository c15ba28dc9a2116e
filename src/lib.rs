//! KernarchOS Execution Core.
//!
//! Ponto central de exportação dos módulos do núcleo de execução:
//! modelo de processos/threads, scheduler, troca de contexto, stacks e mutex.
//!
//! Em bare-metal (`target_os = "none"`) o crate é `no_std` e usa o heap do
//! kernel como alocador global. Em builds hospedados (testes) a camada `arch`
//! usa uma CPU simulada.

#![cfg_attr(not(test), no_std)]

// Habilitar alocação dinâmica (Box/String para payloads de thread)
extern crate alloc;

// --- Módulos de Baixo Nível (Hardware) ---
pub mod arch; // HAL (CPU, seletores, stubs de interrupção)
pub mod drivers; // Serial (log), PIC (EOI), PIT (tick)

// --- Módulos Centrais ---
pub mod core; // Logging, tempo, self-tests
pub mod klib; // Alinhamento, framework de testes
pub mod mm; // Heap do kernel / alocador bruto
pub mod sync; // Spinlock e Mutex

// --- Execução ---
pub mod sched; // Processos, threads, scheduler

#[cfg(target_os = "none")]
mod panic;
