//! Sono por prazo.
//!
//! Não há fila de dormentes: o scheduler varre a tabela a cada passagem e
//! acorda quem tem `wake_time <= now`. Um prazo nunca é antecipado, mas a
//! granularidade é a da passagem (no máximo `SCHED_TICK_INTERVAL` ticks).

use super::scheduler::Scheduler;
use crate::mm::RawAllocator;
use crate::sched::error::{SchedError, SchedResult};
use crate::sched::lockdep;
use crate::sched::task::ThreadState;

impl<A: RawAllocator> Scheduler<A> {
    /// Coloca a thread atual para dormir por `ms` milissegundos a partir de `now_ms`.
    pub fn sleep_current(&mut self, ms: u32, now_ms: u64) -> SchedResult<()> {
        let cur = self.current.ok_or(SchedError::NoCurrent)?;
        if Some(cur) == self.idle {
            return Err(SchedError::IdleProtected);
        }

        let held = lockdep::held(cur);
        if held > 0 {
            crate::kwarn!("(Mutex) Dormindo com mutex retido. count=", held);
        }

        let block = &mut self.table[cur];
        let thread = block.thread.as_mut().ok_or(SchedError::NoThread)?;
        thread.wake_time = now_ms.saturating_add(ms as u64);
        thread.state = ThreadState::Sleeping;

        crate::ktrace!("(Sleep) Dormindo até ms=", thread.wake_time);
        Ok(())
    }

    /// Acorda toda thread cujo prazo já passou. Retorna quantas acordaram.
    pub fn wake_sleepers(&mut self, now_ms: u64) -> usize {
        let mut woken = 0;
        for block in self.table.iter_mut() {
            if let Some(thread) = block.thread.as_mut() {
                if thread.state == ThreadState::Sleeping && now_ms >= thread.wake_time {
                    thread.state = ThreadState::Ready;
                    woken += 1;
                }
            }
        }
        woken
    }
}
