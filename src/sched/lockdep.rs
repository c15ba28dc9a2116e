//! Auditoria de mutexes retidos por bloco.
//!
//! Tudo aqui é lock-free: o `Mutex` pode ser usado no Ring 3, onde não há
//! como mascarar interrupções para consultar o scheduler. O scheduler publica
//! o slot atual a cada troca; o mutex conta aquisições nesse slot.
//!
//! Eventos do mutex que antes iam para o log (contenção, unlock de mutex
//! livre) também são só contados aqui: o log usa `in`/`out` na COM1, que
//! geram #GP fora do Ring 0. O `dump()` do scheduler reporta os contadores.

use super::config::MAX_PROCESSES;
use super::task::Pid;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

const NO_SLOT: usize = usize::MAX;

static CURRENT_SLOT: AtomicUsize = AtomicUsize::new(NO_SLOT);
static CURRENT_PID: AtomicU32 = AtomicU32::new(0);

#[allow(clippy::declare_interior_mutable_const)]
const ZERO: AtomicU32 = AtomicU32::new(0);
static HELD: [AtomicU32; MAX_PROCESSES] = [ZERO; MAX_PROCESSES];

static CONTENTIONS: AtomicU32 = AtomicU32::new(0);
static FREE_UNLOCKS: AtomicU32 = AtomicU32::new(0);

/// Publica o bloco atual (chamado pelo scheduler com interrupções mascaradas).
pub fn publish_current(current: Option<(usize, Pid)>) {
    match current {
        Some((slot, pid)) => {
            CURRENT_PID.store(pid, Ordering::Relaxed);
            CURRENT_SLOT.store(slot, Ordering::Release);
        }
        None => CURRENT_SLOT.store(NO_SLOT, Ordering::Release),
    }
}

pub fn current_slot() -> Option<usize> {
    match CURRENT_SLOT.load(Ordering::Acquire) {
        NO_SLOT => None,
        slot => Some(slot),
    }
}

pub fn current_pid() -> Option<Pid> {
    current_slot().map(|_| CURRENT_PID.load(Ordering::Relaxed))
}

/// Um mutex foi adquirido pelo bloco atual (se houver).
pub fn acquired() {
    if let Some(slot) = current_slot() {
        HELD[slot].fetch_add(1, Ordering::Relaxed);
    }
}

/// Um mutex foi liberado pelo bloco atual (se houver).
pub fn released() {
    if let Some(slot) = current_slot() {
        let _ = HELD[slot].fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }
}

/// Mutexes retidos pelo bloco em `slot`.
pub fn held(slot: usize) -> u32 {
    HELD.get(slot).map_or(0, |n| n.load(Ordering::Relaxed))
}

/// Zera o contador do slot e devolve o valor anterior.
pub fn reset(slot: usize) -> u32 {
    HELD.get(slot).map_or(0, |n| n.swap(0, Ordering::Relaxed))
}

/// Contabiliza diretamente em um slot (testes e self-tests).
pub fn acquired_by(slot: usize) {
    if let Some(n) = HELD.get(slot) {
        n.fetch_add(1, Ordering::Relaxed);
    }
}

/// Um `lock` encontrou o mutex ocupado e vai ceder a CPU.
pub fn note_contention() {
    CONTENTIONS.fetch_add(1, Ordering::Relaxed);
}

pub fn contentions() -> u32 {
    CONTENTIONS.load(Ordering::Relaxed)
}

/// `unlock` de um mutex que já estava livre.
pub fn note_free_unlock() {
    FREE_UNLOCKS.fetch_add(1, Ordering::Relaxed);
}

pub fn free_unlocks() -> u32 {
    FREE_UNLOCKS.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Último slot: nenhum teste do scheduler chega lá.
    const SLOT: usize = MAX_PROCESSES - 1;

    #[test]
    fn counts_per_slot() {
        let _guard = crate::sched::testing::high_slots();
        reset(SLOT);
        acquired_by(SLOT);
        acquired_by(SLOT);
        assert_eq!(held(SLOT), 2);
        assert_eq!(reset(SLOT), 2);
        assert_eq!(held(SLOT), 0);
        assert_eq!(held(MAX_PROCESSES + 10), 0);
    }
}
