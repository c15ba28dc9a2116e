//! Dump da tabela de processos na serial.

use super::scheduler::Scheduler;
use crate::mm::RawAllocator;
use crate::sched::lockdep;
use crate::sched::task::ProcessState;

impl<A: RawAllocator> Scheduler<A> {
    /// Uma linha por bloco ocupado: pid, estado, prioridade, eip, esp e uso de stack.
    pub fn dump(&self) {
        crate::kinfo!("(Sched) Tabela de processos. trocas=", self.context_switches());
        for (slot, block) in self.table.iter().enumerate() {
            if block.is_free() {
                continue;
            }
            let state = match block.state {
                ProcessState::Ready => " READY",
                ProcessState::Running => " RUN",
                ProcessState::Blocked => " BLOCK",
                ProcessState::Terminated => " TERM",
            };
            let usage = block.stack.as_ref().map_or(0, |s| s.cached_usage());
            crate::klog!("  slot=", slot, " pid=", block.pid, state);
            crate::klog!(" prio=", block.priority, " eip=", block.context.eip, " esp=", block.context.esp);
            crate::klog!(" uso=", usage);
            if block.overflow {
                crate::klog!(" OVERFLOW");
            }
            if Some(slot) == self.current() {
                crate::klog!(" <- atual");
            }
            crate::knl!();
        }
        crate::kinfo!("(Stack) Total alocado=", self.stacks().total_allocated());
        crate::kinfo!("(Mutex) Contenções=", lockdep::contentions());
        crate::kinfo!("(Mutex) Unlocks de mutex livre=", lockdep::free_unlocks());
    }
}
