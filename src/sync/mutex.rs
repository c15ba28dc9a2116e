//! Mutex - flag única; contenção cede a CPU ao scheduler
//!
//! Sem dono, sem recursão, sem herança de prioridade. Funciona em Ring 3:
//! o caminho de contenção usa o pedido de yield (int 0x81) e a contabilidade
//! de locks retidos é lock-free (`sched::lockdep`). Nada aqui escreve na
//! serial.
//!
//! Não segure um `Mutex` através de `sleep` ou `exit_thread`.

use crate::sched::lockdep;
use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

/// O lock em si, sem dados protegidos.
pub struct RawMutex {
    locked: AtomicBool,
}

impl RawMutex {
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Test-and-set; em contenção cede a CPU (`sched::yield_now`) e tenta de novo.
    pub fn lock(&self) {
        self.lock_with(crate::sched::yield_now);
    }

    /// Como [`lock`](Self::lock), chamando `relax` a cada tentativa frustrada.
    pub fn lock_with(&self, mut relax: impl FnMut()) {
        let mut contended = false;
        while self.locked.swap(true, Ordering::Acquire) {
            if !contended {
                lockdep::note_contention();
                contended = true;
            }
            relax();
        }
        lockdep::acquired();
    }

    pub fn try_lock(&self) -> bool {
        let ok = !self.locked.swap(true, Ordering::Acquire);
        if ok {
            lockdep::acquired();
        }
        ok
    }

    /// Limpa a flag. Liberar um mutex livre é um erro de uso: contado em
    /// `lockdep::free_unlocks` e ignorado.
    pub fn unlock(&self) {
        if !self.locked.swap(false, Ordering::Release) {
            lockdep::note_free_unlock();
            return;
        }
        lockdep::released();
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}

impl Default for RawMutex {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutex com dados protegidos; o guard libera no drop.
pub struct Mutex<T> {
    raw: RawMutex,
    data: UnsafeCell<T>,
}

// SAFETY: Mutex protege acesso com lock
unsafe impl<T: Send> Send for Mutex<T> {}
unsafe impl<T: Send> Sync for Mutex<T> {}

impl<T> Mutex<T> {
    pub const fn new(data: T) -> Self {
        Self {
            raw: RawMutex::new(),
            data: UnsafeCell::new(data),
        }
    }

    /// Adquire o lock (cede a CPU enquanto contendido)
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.raw.lock();
        MutexGuard { lock: self }
    }

    /// Adquire chamando `relax` a cada tentativa frustrada.
    pub fn lock_with(&self, relax: impl FnMut()) -> MutexGuard<'_, T> {
        self.raw.lock_with(relax);
        MutexGuard { lock: self }
    }

    /// Tenta adquirir sem bloquear
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        self.raw.try_lock().then(|| MutexGuard { lock: self })
    }

    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

pub struct MutexGuard<'a, T> {
    lock: &'a Mutex<T>,
}

impl<T> Deref for MutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: Lock está adquirido
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for MutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: Lock está adquirido
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for MutexGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.raw.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::vec::Vec;

    #[test]
    fn try_lock_fails_while_held() {
        let m = Mutex::new(1);
        let guard = m.lock();
        assert!(m.is_locked());
        assert!(m.try_lock().is_none());
        drop(guard);
        assert!(!m.is_locked());
        assert_eq!(*m.try_lock().unwrap(), 1);
    }

    #[test]
    fn contention_calls_relax_until_free() {
        let m = RawMutex::new();
        m.lock_with(|| {});
        let mut spins = 0;
        m.lock_with(|| {
            spins += 1;
            if spins == 3 {
                m.unlock();
            }
        });
        assert_eq!(spins, 3);
        assert!(m.is_locked());
        m.unlock();
    }

    #[test]
    fn unlock_of_free_mutex_is_ignored() {
        let before = lockdep::free_unlocks();
        let m = RawMutex::new();
        m.unlock();
        assert!(!m.is_locked());
        assert!(lockdep::free_unlocks() > before);
    }

    // Threads de usuário usam o mesmo caminho: qualquer escrita na serial
    // seria `out` na COM1 a partir do Ring 3.
    #[test]
    fn contended_path_stays_off_the_serial_line() {
        use crate::drivers::serial::take_captured;

        take_captured();
        let before = lockdep::contentions();
        let m = RawMutex::new();
        m.lock_with(|| {});
        let mut spins = 0;
        m.lock_with(|| {
            spins += 1;
            if spins == 2 {
                m.unlock();
            }
        });
        m.unlock();
        m.unlock();

        assert_eq!(take_captured(), "");
        assert!(lockdep::contentions() > before);
    }

    #[test]
    fn threads_never_overlap() {
        let counter = Arc::new(Mutex::new(0u64));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    for _ in 0..10_000 {
                        let mut n = counter.lock();
                        let v = *n;
                        std::hint::spin_loop();
                        *n = v + 1;
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        assert_eq!(Arc::try_unwrap(counter).ok().unwrap().into_inner(), 40_000);
    }
}
