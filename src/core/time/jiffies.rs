//! Contador de ticks do sistema (jiffies) e relógio monotônico em ms.
//!
//! - Incrementado apenas pelo handler do timer (`drivers::timer::pit::on_tick`).
//! - Lock-free: leituras podem vir de qualquer contexto, inclusive Ring 3.
//! - `now_ms()` é a base de tempo dos `wake_time` das threads dormindo.

use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Frequência padrão do tick (Hz), usada até `set_frequency`.
pub const DEFAULT_HZ: u32 = 1000;

/// Ticks desde o boot.
static JIFFIES: AtomicU64 = AtomicU64::new(0);

/// Frequência atual do tick em Hz. Nunca zero.
static HZ: AtomicU32 = AtomicU32::new(DEFAULT_HZ);

/// Retorna o número atual de ticks.
#[inline]
pub fn ticks() -> u64 {
    JIFFIES.load(Ordering::Relaxed)
}

/// Incrementa o contador e retorna o novo valor.
/// Deve ser chamado APENAS pelo handler de interrupção do timer.
#[inline]
pub fn inc_jiffies() -> u64 {
    JIFFIES.fetch_add(1, Ordering::Relaxed) + 1
}

/// Frequência atual do tick.
#[inline]
pub fn frequency() -> u32 {
    HZ.load(Ordering::Relaxed)
}

/// Registra a frequência programada no timer. Zero é ignorado.
pub fn set_frequency(hz: u32) {
    if hz == 0 {
        crate::kwarn!("(Time) Frequência zero ignorada");
        return;
    }
    HZ.store(hz, Ordering::Relaxed);
}

/// Converte ticks em milissegundos para uma frequência.
#[inline]
pub const fn ticks_to_ms(ticks: u64, hz: u32) -> u64 {
    ticks * 1000 / hz as u64
}

/// Milissegundos desde o boot: `ticks * 1000 / frequência`.
#[inline]
pub fn now_ms() -> u64 {
    ticks_to_ms(ticks(), frequency())
}
