//! Driver do PIT (Programmable Interval Timer) - Intel 8253/8254.
//!
//! # Responsabilidades
//! 1. Gerar o "Heartbeat" do sistema (IRQ 0, vetor 32).
//! 2. Contabilizar o tempo global (`core::time::jiffies`).
//! 3. Acionar o scheduler a cada `SCHED_TICK_INTERVAL` ticks.
//!
//! # Limitações
//! - Frequência base fixa de ~1.19 MHz; divisor de 16 bits (mínimo ~19 Hz).

use crate::core::time::jiffies;
use crate::sched::config::SCHED_TICK_INTERVAL;
use crate::sched::ExecutionContext;
use spin::Mutex;

/// Frequência base do oscilador do PIT (1.193182 MHz).
pub const BASE_FREQUENCY: u32 = 1_193_182;

/// Maior divisor programável no canal 0.
const MAX_DIVISOR: u32 = 65_535;

#[cfg(all(target_arch = "x86", target_os = "none"))]
const PORT_CHANNEL0: u16 = 0x40;
#[cfg(all(target_arch = "x86", target_os = "none"))]
const PORT_COMMAND: u16 = 0x43;

/// Canal 0, lobyte/hibyte, modo 3 (onda quadrada).
#[cfg(all(target_arch = "x86", target_os = "none"))]
const CMD_SQUARE_WAVE: u8 = 0x36;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitError {
    /// Zero, acima da base ou abaixo do mínimo do divisor
    InvalidFrequency,
}

impl PitError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidFrequency => "Frequência de timer inválida",
        }
    }
}

impl core::fmt::Display for PitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estado do PIT.
pub struct Pit {
    frequency: u32,
}

impl Pit {
    pub const fn new() -> Self {
        Self { frequency: 0 }
    }

    /// Divisor para `freq` Hz.
    pub const fn divisor_for(freq: u32) -> Result<u32, PitError> {
        if freq == 0 || freq > BASE_FREQUENCY {
            return Err(PitError::InvalidFrequency);
        }
        let divisor = BASE_FREQUENCY / freq;
        if divisor > MAX_DIVISOR {
            return Err(PitError::InvalidFrequency);
        }
        Ok(divisor)
    }

    /// Programa o canal 0. Devolve a frequência real (o divisor é inteiro).
    pub fn set_frequency(&mut self, freq: u32) -> Result<u32, PitError> {
        let divisor = match Self::divisor_for(freq) {
            Ok(d) => d,
            Err(e) => {
                crate::kwarn!("(Timer) Frequência inválida. hz=", freq);
                return Err(e);
            }
        };
        let actual = BASE_FREQUENCY / divisor;

        #[cfg(all(target_arch = "x86", target_os = "none"))]
        unsafe {
            use crate::arch::x86::port::outb;
            outb(PORT_COMMAND, CMD_SQUARE_WAVE);
            outb(PORT_CHANNEL0, (divisor & 0xFF) as u8);
            outb(PORT_CHANNEL0, (divisor >> 8) as u8);
        }

        self.frequency = actual;
        crate::ktrace!("(Timer) Divisor=", divisor);
        Ok(actual)
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }
}

impl Default for Pit {
    fn default() -> Self {
        Self::new()
    }
}

/// Instância global; só a configuração passa por aqui, o tick usa atômicos.
pub static PIT: Mutex<Pit> = Mutex::new(Pit::new());

/// Programa o PIT para `freq` Hz e publica a frequência real em `jiffies`.
pub fn init(freq: u32) -> Result<u32, PitError> {
    let actual = PIT.lock().set_frequency(freq)?;
    jiffies::set_frequency(actual);
    crate::kinfo!("(Timer) PIT configurado. hz=", actual);
    Ok(actual)
}

/// O scheduler roda neste tick?
#[inline]
pub const fn is_sched_tick(tick: u64) -> bool {
    tick % SCHED_TICK_INTERVAL == 0
}

/// Handler do IRQ 0 (chamado por `sched_timer_stub`).
///
/// O EOI vai antes do scheduler: se houver troca, esta função não retorna.
pub fn on_tick(ctx: &mut ExecutionContext) {
    let tick = jiffies::inc_jiffies();
    crate::drivers::pic::send_eoi(0);

    if is_sched_tick(tick) {
        crate::sched::schedule(Some(ctx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisor_bounds() {
        assert_eq!(Pit::divisor_for(1000), Ok(1193));
        assert_eq!(Pit::divisor_for(0), Err(PitError::InvalidFrequency));
        assert_eq!(Pit::divisor_for(BASE_FREQUENCY + 1), Err(PitError::InvalidFrequency));
        // 18 Hz exige divisor > 65535
        assert_eq!(Pit::divisor_for(18), Err(PitError::InvalidFrequency));
        assert!(Pit::divisor_for(19).is_ok());
    }

    #[test]
    fn actual_frequency_follows_integer_divisor() {
        let mut pit = Pit::new();
        assert_eq!(pit.set_frequency(1000), Ok(1000));
        assert_eq!(pit.set_frequency(100), Ok(100));
        assert_eq!(pit.set_frequency(7000), Ok(BASE_FREQUENCY / 170));
        assert_eq!(pit.frequency(), BASE_FREQUENCY / 170);
        assert!(pit.set_frequency(0).is_err());
        assert_eq!(pit.frequency(), BASE_FREQUENCY / 170);
    }

    #[test]
    fn scheduler_runs_every_interval() {
        let runs = (1..=100u64).filter(|&t| is_sched_tick(t)).count();
        assert_eq!(runs as u64, 100 / SCHED_TICK_INTERVAL);
        assert!(!is_sched_tick(1));
    }
}
