//! # Scheduler Round-Robin (lógica de decisão)
//!
//! Estrutura única e explicitamente possuída: tabela fixa de blocos de
//! controle indexada por slot, `current` como `Option<slot>`, o gerenciador
//! de stacks e o dono atual da FPU.
//!
//! Esta camada não toca em hardware de troca de contexto: `schedule` devolve
//! uma [`Decision`] e a cola em `sched::mod` faz o restore. Por isso roda
//! inteira nos testes de host.
//!
//! ## Uma passagem (`schedule`)
//! 1. interrupções já mascaradas pelo chamador (lock do scheduler);
//! 2. reap do bloco atual se o payload estiver `Terminated`;
//! 3. acorda threads cujo prazo venceu;
//! 4. com contexto e bloco atual: verifica a stack e salva o contexto;
//! 5. round-robin a partir do slot seguinte ao último que rodou: bloco
//!    `Ready` (ou o próprio atual) com prioridade > 0 e thread pronta;
//! 6. senão a idle (prioridade 0);
//! 7. nada: starvation; escolhido == atual: sem troca;
//! 8. senão rebaixa o atual, promove o escolhido e devolve `Switch`.

use crate::arch::{Cpu, CpuOps};
use crate::mm::RawAllocator;
use crate::sched::config::{
    MAX_PROCESSES, OVERFLOW_POLICY, PRIORITY_DEFAULT, PRIORITY_IDLE, STACK_OVERFLOW_EXIT_CODE,
    STACK_SIZE,
};
use crate::sched::context::ExecutionContext;
use crate::sched::error::{SchedError, SchedResult};
use crate::sched::lockdep;
use crate::sched::request::Request;
use crate::sched::stack::{OverflowPolicy, StackManager};
use crate::sched::task::{
    ControlBlock, FpuArea, Pid, Privilege, ProcessState, Thread, ThreadEntry, ThreadState,
};
use alloc::boxed::Box;

/// Resultado de uma passagem do scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Continua no bloco atual (ou no contexto interrompido)
    Stay,
    /// Restaurar o contexto do bloco neste slot
    Switch(usize),
    /// Nenhum bloco executável, nem a idle
    Starved,
}

pub struct Scheduler<A: RawAllocator> {
    pub(super) table: [ControlBlock; MAX_PROCESSES],
    pub(super) current: Option<usize>,
    /// Último slot escolhido: o round-robin começa no seguinte
    pub(super) cursor: Option<usize>,
    pub(super) idle: Option<usize>,
    next_pid: Pid,
    pub(super) stacks: StackManager<A>,
    pub(super) fpu_owner: Option<usize>,
    policy: OverflowPolicy,
    context_switches: u64,
}

impl<A: RawAllocator> Scheduler<A> {
    pub const fn new(allocator: A) -> Self {
        Self {
            table: [ControlBlock::EMPTY; MAX_PROCESSES],
            current: None,
            cursor: None,
            idle: None,
            next_pid: 1,
            stacks: StackManager::new(allocator),
            fpu_owner: None,
            policy: OVERFLOW_POLICY,
            context_switches: 0,
        }
    }

    pub fn set_overflow_policy(&mut self, policy: OverflowPolicy) {
        self.policy = policy;
    }

    // =========================================================================
    // CONSULTAS
    // =========================================================================

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_pid(&self) -> Option<Pid> {
        self.current.map(|slot| self.table[slot].pid)
    }

    pub fn idle_slot(&self) -> Option<usize> {
        self.idle
    }

    pub fn block(&self, slot: usize) -> Option<&ControlBlock> {
        self.table.get(slot)
    }

    /// Slot do bloco com este pid (vivo ou terminado e ainda não reutilizado).
    pub fn slot_of(&self, pid: Pid) -> Option<usize> {
        if pid == 0 {
            return None;
        }
        self.table.iter().position(|b| b.pid == pid)
    }

    /// Código de saída de um bloco terminado, até a linha ser reutilizada.
    pub fn exit_code(&self, pid: Pid) -> Option<i32> {
        let block = &self.table[self.slot_of(pid)?];
        match block.state {
            ProcessState::Terminated => block.exit_code,
            _ => None,
        }
    }

    /// Ponteiro estável para o contexto salvo de um slot (usado no restore).
    pub fn context_ptr(&self, slot: usize) -> *const ExecutionContext {
        &self.table[slot].context
    }

    /// Mutexes retidos pelo bloco em `slot`.
    pub fn held_locks(&self, slot: usize) -> u32 {
        lockdep::held(slot)
    }

    pub fn context_switches(&self) -> u64 {
        self.context_switches
    }

    pub fn stacks(&self) -> &StackManager<A> {
        &self.stacks
    }

    // =========================================================================
    // CRIAÇÃO
    // =========================================================================

    fn free_slot(&self) -> Option<usize> {
        self.table.iter().position(ControlBlock::is_free)
    }

    /// Próximo pid que nenhuma linha da tabela carrega. O contador dá a volta
    /// em `u32::MAX` e pula o 0.
    fn take_pid(&mut self) -> Pid {
        loop {
            let pid = self.next_pid;
            self.next_pid = self.next_pid.wrapping_add(1).max(1);
            if self.slot_of(pid).is_none() {
                return pid;
            }
        }
    }

    fn spawn(
        &mut self,
        entry: u32,
        privilege: Privilege,
        priority: u8,
        thread: Option<Box<Thread>>,
    ) -> SchedResult<Pid> {
        let slot = match self.free_slot() {
            Some(slot) => slot,
            None => {
                crate::kerror!("(Sched) Tabela de processos cheia. max=", MAX_PROCESSES);
                return Err(SchedError::TableFull);
            }
        };

        let stack = self.stacks.allocate(STACK_SIZE)?;

        let pid = self.take_pid();

        let mut context = ExecutionContext::new_thread(
            entry,
            stack.top() as u32,
            privilege.code_selector(),
            privilege.data_selector(),
        );
        // O trampolim de thread recebe o payload em EAX.
        if let Some(t) = thread.as_deref() {
            context.eax = t as *const Thread as usize as u32;
        }

        lockdep::reset(slot);
        self.table[slot] = ControlBlock {
            pid,
            state: ProcessState::Ready,
            priority,
            privilege,
            stack: Some(stack),
            context,
            fpu: None,
            thread,
            exit_code: None,
            overflow: false,
            switches: 0,
        };

        crate::kdebug!("(Sched) Bloco criado. pid=", pid);
        Ok(pid)
    }

    /// Processo simples começando em `entry`, prioridade padrão.
    pub fn create_process(&mut self, entry: u32, privilege: Privilege) -> SchedResult<Pid> {
        self.spawn(entry, privilege, PRIORITY_DEFAULT, None)
    }

    /// Thread: o bloco começa no `trampoline`, que lê o payload de EAX.
    pub fn create_thread(
        &mut self,
        trampoline: u32,
        entry: ThreadEntry,
        arg: Option<&str>,
        privilege: Privilege,
    ) -> SchedResult<Pid> {
        let thread = Box::new(Thread::new(entry, arg)?);
        self.spawn(trampoline, privilege, PRIORITY_DEFAULT, Some(thread))
    }

    /// A idle: prioridade 0, Ring 0, sempre pronta.
    pub fn create_idle(&mut self, entry: u32) -> SchedResult<Pid> {
        if let Some(slot) = self.idle {
            crate::kwarn!("(Idle) Já existe. pid=", self.table[slot].pid);
            return Ok(self.table[slot].pid);
        }
        let pid = self.spawn(entry, Privilege::Kernel, PRIORITY_IDLE, None)?;
        self.idle = self.slot_of(pid);
        crate::kinfo!("(Idle) Criada. pid=", pid);
        Ok(pid)
    }

    // =========================================================================
    // ESCALONAMENTO
    // =========================================================================

    /// Uma passagem do scheduler.
    ///
    /// `ctx` é o contexto interrompido do bloco atual. `None` só é aceito
    /// quando não há bloco atual vivo (boot, ou após um exit); com um bloco
    /// vivo e sem contexto não há o que salvar, então nada muda.
    pub fn schedule(&mut self, ctx: Option<&ExecutionContext>, now_ms: u64) -> Decision {
        // 2. Reap
        if let Some(cur) = self.current {
            let finished = self.table[cur]
                .thread
                .as_ref()
                .filter(|t| t.state == ThreadState::Terminated)
                .map(|t| t.return_code);
            if let Some(code) = finished {
                let _ = self.exit_current(code);
            }
        }

        // 3. Acordar
        self.wake_sleepers(now_ms);

        // 4. Salvar
        match (ctx, self.current) {
            (Some(ctx), Some(cur)) => {
                if self.check_stack(cur, ctx.esp as usize) {
                    self.table[cur].context = *ctx;
                }
            }
            (None, Some(cur)) => {
                crate::kwarn!("(Sched) Passagem sem contexto com bloco vivo. pid=", self.table[cur].pid);
                return Decision::Stay;
            }
            _ => {}
        }

        // 5/6. Escolher
        let Some(selected) = self.select_next(now_ms) else {
            crate::kerror!("(Sched) FATAL: nenhum bloco executável (starvation)");
            return Decision::Starved;
        };

        // 7/8. Trocar
        if Some(selected) == self.current {
            return Decision::Stay;
        }
        self.switch_to(selected);
        Decision::Switch(selected)
    }

    /// Aplica um pedido voluntário e faz a passagem.
    pub fn service(
        &mut self,
        request: Request,
        ctx: Option<&ExecutionContext>,
        now_ms: u64,
    ) -> Decision {
        match request {
            Request::Yield | Request::Sleep(0) => {}
            Request::Sleep(ms) => {
                if let Err(e) = self.sleep_current(ms, now_ms) {
                    crate::kwarn!(e.as_str());
                }
            }
            Request::Exit(code) => {
                if self.finish_current_thread(code).is_ok() {
                    return self.schedule(None, now_ms);
                }
                match self.exit_current(code) {
                    Ok(()) => return self.schedule(None, now_ms),
                    Err(e) => crate::kerror!(e.as_str()),
                }
            }
        }
        self.schedule(ctx, now_ms)
    }

    /// Round-robin: primeiro elegível depois do cursor; o bloco atual é
    /// examinado por último. Sem nenhum, a idle.
    fn select_next(&self, now_ms: u64) -> Option<usize> {
        let start = self.cursor.unwrap_or(MAX_PROCESSES - 1);
        for step in 1..=MAX_PROCESSES {
            let slot = (start + step) % MAX_PROCESSES;
            let block = &self.table[slot];
            if block.priority == PRIORITY_IDLE || !block.is_eligible(now_ms) {
                continue;
            }
            if block.state == ProcessState::Ready || Some(slot) == self.current {
                return Some(slot);
            }
        }
        self.idle.filter(|&slot| self.table[slot].state.is_runnable())
    }

    fn switch_to(&mut self, slot: usize) {
        if let Some(out) = self.current {
            let block = &mut self.table[out];
            if block.state == ProcessState::Running {
                block.state = ProcessState::Ready;
            }
            if let Some(t) = block.thread.as_mut() {
                if t.state == ThreadState::Running {
                    t.state = ThreadState::Ready;
                }
            }
        }

        let block = &mut self.table[slot];
        block.state = ProcessState::Running;
        block.switches += 1;
        if let Some(t) = block.thread.as_mut() {
            if matches!(t.state, ThreadState::Ready | ThreadState::Sleeping) {
                t.state = ThreadState::Running;
            }
        }

        self.current = Some(slot);
        self.cursor = Some(slot);
        self.context_switches += 1;
        crate::ktrace!("(Sched) Troca para pid=", block.pid);
    }

    /// Verifica a stack do bloco em `slot` dado o ESP salvo.
    /// Retorna `false` se o bloco foi terminado pela política.
    fn check_stack(&mut self, slot: usize, sp: usize) -> bool {
        let block = &mut self.table[slot];
        let Some(stack) = block.stack.as_mut() else {
            return true;
        };
        if self.stacks.is_safe(stack, sp) {
            return true;
        }

        crate::kerror!("(Stack) Overflow iminente. pid=", block.pid);
        block.overflow = true;

        if self.policy == OverflowPolicy::Terminate && Some(slot) != self.idle {
            crate::kerror!("(Stack) Terminando bloco por overflow. pid=", block.pid);
            let _ = self.exit_current(STACK_OVERFLOW_EXIT_CODE);
            return false;
        }
        true
    }

    // =========================================================================
    // TÉRMINO
    // =========================================================================

    /// Marca o payload do bloco atual como terminado; o reap acontece no
    /// passo 2 da próxima passagem.
    fn finish_current_thread(&mut self, code: i32) -> SchedResult<()> {
        let cur = self.current.ok_or(SchedError::NoCurrent)?;
        if Some(cur) == self.idle {
            return Err(SchedError::IdleProtected);
        }
        let thread = self.table[cur].thread.as_mut().ok_or(SchedError::NoThread)?;
        thread.return_code = code;
        thread.state = ThreadState::Terminated;
        Ok(())
    }

    /// Registra o código, libera o payload e termina o bloco atual.
    pub fn exit_current(&mut self, code: i32) -> SchedResult<()> {
        let Some(cur) = self.current else {
            crate::kerror!("(Sched) exit sem bloco atual");
            return Err(SchedError::NoCurrent);
        };
        if Some(cur) == self.idle {
            crate::kerror!("(Sched) A idle não pode terminar");
            return Err(SchedError::IdleProtected);
        }

        if let Some(thread) = self.table[cur].thread.take() {
            crate::ktrace!("(Thread) Payload liberado. code=", thread.return_code);
        }
        self.terminate(cur, code)
    }

    /// Libera stack e FPU do bloco atual e o marca `Terminated`.
    pub fn terminate(&mut self, slot: usize, code: i32) -> SchedResult<()> {
        if self.current != Some(slot) {
            crate::kerror!("(Sched) terminate em bloco que não é o atual. slot=", slot);
            return Err(SchedError::NotCurrent);
        }
        if Some(slot) == self.idle {
            crate::kerror!("(Sched) A idle não pode terminar");
            return Err(SchedError::IdleProtected);
        }

        let block = &mut self.table[slot];
        if let Some(stack) = block.stack.take() {
            let _ = self.stacks.destroy(stack);
        }
        if let Some(area) = block.fpu.take() {
            area.release(self.stacks.allocator());
        }
        if self.fpu_owner == Some(slot) {
            self.fpu_owner = None;
        }

        block.state = ProcessState::Terminated;
        block.exit_code = Some(code);
        self.current = None;

        let held = lockdep::reset(slot);
        if held > 0 {
            crate::kerror!("(Mutex) Bloco terminou com mutex retido. count=", held);
        }

        crate::kinfo!("(Sched) Processo terminado. pid=", block.pid);
        Ok(())
    }

    // =========================================================================
    // FPU PREGUIÇOSA
    // =========================================================================

    /// Corpo do handler de #NM (CR0.TS setado e instrução de FPU executada).
    pub fn handle_fpu_fault(&mut self) -> SchedResult<()> {
        Cpu::fpu_clear_trap();

        let Some(cur) = self.current else {
            return Err(SchedError::NoCurrent);
        };
        if self.fpu_owner == Some(cur) {
            return Ok(());
        }

        if let Some(owner) = self.fpu_owner.take() {
            if let Some(area) = self.table[owner].fpu.as_mut() {
                // SAFETY: área de 512 bytes alinhada a 16, exclusiva do dono.
                unsafe { Cpu::fpu_save(area.as_mut_ptr()) };
                area.mark_saved();
            }
        }

        let block = &mut self.table[cur];
        match block.fpu.as_mut() {
            Some(area) if area.is_saved() => {
                // SAFETY: conteúdo produzido por FXSAVE deste mesmo bloco.
                unsafe { Cpu::fpu_restore(area.as_mut_ptr()) };
            }
            Some(_) => Cpu::fpu_init(),
            None => {
                Cpu::fpu_init();
                block.fpu = Some(FpuArea::allocate(self.stacks.allocator())?);
            }
        }

        self.fpu_owner = Some(cur);
        crate::ktrace!("(FPU) Dono agora é pid=", block.pid);
        Ok(())
    }

    pub fn fpu_owner(&self) -> Option<usize> {
        self.fpu_owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::serial;
    use crate::sched::testing::{high_slots, FakeArena};

    const ENTRY: u32 = 0x0040_0000;
    const TRAMPOLINE: u32 = 0x0000_1000;

    fn noop() {}

    fn new_sched() -> Box<Scheduler<FakeArena>> {
        Box::new(Scheduler::new(FakeArena::new()))
    }

    /// Simula um tick: o bloco atual é interrompido com o próprio contexto.
    fn tick(s: &mut Scheduler<FakeArena>, now: u64) -> Decision {
        let ctx = s.current().map(|slot| s.table[slot].context);
        s.schedule(ctx.as_ref(), now)
    }

    fn running_count(s: &Scheduler<FakeArena>) -> usize {
        s.table
            .iter()
            .filter(|b| b.state == ProcessState::Running)
            .count()
    }

    fn spawn_thread(s: &mut Scheduler<FakeArena>) -> Pid {
        s.create_thread(TRAMPOLINE, ThreadEntry::Plain(noop), None, Privilege::User)
            .unwrap()
    }

    #[test]
    fn round_robin_visits_in_table_order() {
        let mut s = new_sched();
        for _ in 0..3 {
            s.create_process(ENTRY, Privilege::User).unwrap();
        }

        assert_eq!(s.schedule(None, 0), Decision::Switch(0));
        for expected in [1, 2, 0, 1, 2] {
            assert_eq!(tick(&mut s, 0), Decision::Switch(expected));
            assert_eq!(running_count(&s), 1);
            assert_eq!(s.table[expected].state, ProcessState::Running);
        }
    }

    #[test]
    fn ready_blocks_cycle_without_idle() {
        let mut s = new_sched();
        s.create_idle(ENTRY).unwrap();
        for _ in 0..3 {
            s.create_thread(TRAMPOLINE, ThreadEntry::Plain(noop), None, Privilege::User)
                .unwrap();
        }

        assert_eq!(s.schedule(None, 0), Decision::Switch(1));
        for expected in [2, 3, 1, 2, 3, 1] {
            assert_eq!(tick(&mut s, 0), Decision::Switch(expected));
        }
        assert_eq!(s.table[0].switches, 0);
        assert_eq!(s.table[0].state, ProcessState::Ready);
    }

    #[test]
    fn lone_process_keeps_cpu() {
        let mut s = new_sched();
        s.create_process(ENTRY, Privilege::User).unwrap();
        assert_eq!(s.schedule(None, 0), Decision::Switch(0));
        assert_eq!(tick(&mut s, 10), Decision::Stay);
        assert_eq!(s.context_switches(), 1);
    }

    #[test]
    fn equal_share_over_many_passes() {
        let mut s = new_sched();
        for _ in 0..3 {
            s.create_process(ENTRY, Privilege::User).unwrap();
        }
        s.schedule(None, 0);
        for _ in 0..299 {
            tick(&mut s, 0);
        }
        for slot in 0..3 {
            assert_eq!(s.table[slot].switches, 100);
        }
    }

    #[test]
    fn idle_runs_only_when_nothing_else_is_ready() {
        let mut s = new_sched();
        s.create_idle(ENTRY).unwrap();
        assert_eq!(s.schedule(None, 0), Decision::Switch(0));

        s.create_process(ENTRY, Privilege::User).unwrap();
        assert_eq!(tick(&mut s, 0), Decision::Switch(1));
        // Com um bloco pronto a idle nunca é escolhida
        assert_eq!(tick(&mut s, 0), Decision::Stay);
        assert_eq!(s.table[0].state, ProcessState::Ready);
    }

    #[test]
    fn sleeping_thread_resumes_after_deadline() {
        let mut s = new_sched();
        s.create_idle(ENTRY).unwrap();
        let t = spawn_thread(&mut s);
        s.create_process(ENTRY, Privilege::User).unwrap();
        let t_slot = s.slot_of(t).unwrap();

        assert_eq!(s.schedule(None, 0), Decision::Switch(t_slot));
        let ctx = s.table[t_slot].context;
        assert_eq!(s.service(Request::Sleep(50), Some(&ctx), 0), Decision::Switch(2));
        assert_eq!(
            s.table[t_slot].thread.as_ref().unwrap().state,
            ThreadState::Sleeping
        );

        for now in [10, 30, 49] {
            assert_eq!(tick(&mut s, now), Decision::Stay);
        }
        assert_eq!(tick(&mut s, 50), Decision::Switch(t_slot));
        assert_eq!(
            s.table[t_slot].thread.as_ref().unwrap().state,
            ThreadState::Running
        );
    }

    #[test]
    fn idle_covers_a_sleeping_thread() {
        let mut s = new_sched();
        s.create_idle(ENTRY).unwrap();
        let t = spawn_thread(&mut s);
        let t_slot = s.slot_of(t).unwrap();

        s.schedule(None, 0);
        let ctx = s.table[t_slot].context;
        assert_eq!(s.service(Request::Sleep(20), Some(&ctx), 100), Decision::Switch(0));
        assert_eq!(tick(&mut s, 119), Decision::Stay);
        assert_eq!(tick(&mut s, 121), Decision::Switch(t_slot));
    }

    #[test]
    fn sleep_zero_is_a_yield() {
        let mut s = new_sched();
        spawn_thread(&mut s);
        spawn_thread(&mut s);
        s.schedule(None, 0);
        let ctx = s.table[0].context;
        assert_eq!(s.service(Request::Sleep(0), Some(&ctx), 0), Decision::Switch(1));
        assert_eq!(s.table[0].thread.as_ref().unwrap().state, ThreadState::Ready);
    }

    #[test]
    fn exit_releases_everything_and_keeps_code() {
        let mut s = new_sched();
        let a = s.create_process(ENTRY, Privilege::User).unwrap();
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.schedule(None, 0);
        s.handle_fpu_fault().unwrap();
        assert_eq!(s.stacks().allocator().live(), 3);

        assert_eq!(s.service(Request::Exit(7), None, 0), Decision::Switch(1));
        assert_eq!(s.table[0].state, ProcessState::Terminated);
        assert!(s.table[0].stack.is_none() && s.table[0].fpu.is_none());
        assert_eq!(s.fpu_owner(), None);
        assert_eq!(s.stacks().allocator().live(), 1);
        assert_eq!(s.exit_code(a), Some(7));

        // A linha é reutilizada; o código antigo deixa de existir
        let c = s.create_process(ENTRY, Privilege::User).unwrap();
        assert_eq!(s.slot_of(c), Some(0));
        assert_ne!(c, a);
        assert_eq!(s.exit_code(a), None);
    }

    #[test]
    fn finished_thread_is_reaped_on_next_pass() {
        let mut s = new_sched();
        let t = spawn_thread(&mut s);
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.schedule(None, 0);

        // Entry point retornou 5 sem passar pelo pedido de exit
        {
            let thread = s.table[0].thread.as_mut().unwrap();
            thread.return_code = 5;
            thread.state = ThreadState::Terminated;
        }
        assert_eq!(s.schedule(None, 0), Decision::Switch(1));
        assert!(s.table[0].thread.is_none());
        assert_eq!(s.exit_code(t), Some(5));
    }

    #[test]
    fn thread_exit_request_goes_through_reap() {
        let mut s = new_sched();
        let t = spawn_thread(&mut s);
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.schedule(None, 0);

        assert_eq!(s.service(Request::Exit(-3), None, 0), Decision::Switch(1));
        assert_eq!(s.exit_code(t), Some(-3));
        assert!(s.table[0].is_free());
    }

    #[test]
    fn idle_cannot_exit_or_sleep() {
        let mut s = new_sched();
        s.create_idle(ENTRY).unwrap();
        s.schedule(None, 0);
        assert_eq!(s.exit_current(0), Err(SchedError::IdleProtected));
        assert_eq!(s.sleep_current(10, 0), Err(SchedError::IdleProtected));
        assert_eq!(s.table[0].state, ProcessState::Running);
    }

    #[test]
    fn terminate_requires_current() {
        let mut s = new_sched();
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.schedule(None, 0);
        assert_eq!(s.terminate(1, 0), Err(SchedError::NotCurrent));
        assert_eq!(s.table[1].state, ProcessState::Ready);
    }

    #[test]
    fn exit_without_current_fails() {
        let mut s = new_sched();
        assert_eq!(s.exit_current(1), Err(SchedError::NoCurrent));
    }

    #[test]
    fn full_table_rejects_new_blocks() {
        let _guard = high_slots();
        let mut s = new_sched();
        for _ in 0..MAX_PROCESSES {
            s.create_process(ENTRY, Privilege::User).unwrap();
        }
        assert_eq!(
            s.create_process(ENTRY, Privilege::User),
            Err(SchedError::TableFull)
        );
        assert_eq!(s.stacks().allocator().live(), MAX_PROCESSES);
    }

    #[test]
    fn stack_failure_leaves_row_free() {
        let mut s = Box::new(Scheduler::new(FakeArena::with_budget(0)));
        assert_eq!(
            s.create_process(ENTRY, Privilege::User),
            Err(SchedError::StackAllocFailed)
        );
        assert!(s.table[0].is_free());
        assert_eq!(s.stacks().allocator().live(), 0);
    }

    #[test]
    fn mismatched_entry_allocates_nothing() {
        let mut s = new_sched();
        fn with_arg(_: &str) {}
        assert_eq!(
            s.create_thread(TRAMPOLINE, ThreadEntry::WithArg(with_arg), None, Privilege::User),
            Err(SchedError::InvalidEntry)
        );
        assert_eq!(s.stacks().allocator().live(), 0);
        assert!(s.table[0].is_free());
    }

    #[test]
    fn thread_context_carries_payload_pointer() {
        let mut s = new_sched();
        let t = spawn_thread(&mut s);
        let block = &s.table[s.slot_of(t).unwrap()];
        let payload = block.thread.as_deref().unwrap() as *const Thread as usize;
        assert_eq!(block.context.eip, TRAMPOLINE);
        assert_eq!(block.context.eax as usize, payload & 0xFFFF_FFFF);
    }

    #[test]
    fn initial_context_fields() {
        let mut s = new_sched();
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.create_idle(ENTRY + 0x10).unwrap();

        let user = &s.table[0];
        let top = user.stack.as_ref().unwrap().top() as u32;
        assert_eq!(user.context.eip, ENTRY);
        assert_eq!(user.context.esp, top);
        assert_eq!(user.context.eflags, 0x202);
        assert_eq!(user.context.cs, 0x1B);
        assert_eq!(user.context.ss, 0x23);
        assert_eq!(user.context.ds, 0x23);

        let idle = &s.table[1];
        assert_eq!(idle.priority, PRIORITY_IDLE);
        assert_eq!(idle.context.cs, 0x08);
        assert_eq!(idle.context.ss, 0x10);
    }

    #[test]
    fn interrupted_context_is_saved_verbatim() {
        let mut s = new_sched();
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.schedule(None, 0);

        let mut ctx = s.table[0].context;
        ctx.eax = 0xDEAD_BEEF;
        ctx.edi = 7;
        ctx.eip = ENTRY + 0x123;
        ctx.esp -= 64;
        ctx.eflags = 0x246;
        assert_eq!(s.schedule(Some(&ctx), 0), Decision::Switch(1));
        assert_eq!(s.table[0].context, ctx);
        assert_eq!(s.context_ptr(0), &s.table[0].context as *const _);
    }

    #[test]
    fn context_without_frame_is_ignored_while_current_lives() {
        let mut s = new_sched();
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.schedule(None, 0);
        assert_eq!(s.schedule(None, 0), Decision::Stay);
        assert_eq!(s.current(), Some(0));
    }

    #[test]
    fn overflow_warns_by_default() {
        let mut s = new_sched();
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.schedule(None, 0);
        serial::take_captured();

        let mut ctx = s.table[0].context;
        ctx.esp -= (STACK_SIZE as u32 * 95) / 100;
        assert_eq!(s.schedule(Some(&ctx), 0), Decision::Stay);
        assert!(s.table[0].overflow);
        assert_eq!(s.table[0].state, ProcessState::Running);
        if cfg!(not(feature = "no_logs")) {
            assert!(serial::take_captured().contains("Overflow"));
        }
    }

    #[test]
    fn overflow_terminates_under_strict_policy() {
        let mut s = new_sched();
        s.set_overflow_policy(OverflowPolicy::Terminate);
        let a = s.create_process(ENTRY, Privilege::User).unwrap();
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.schedule(None, 0);

        let mut ctx = s.table[0].context;
        ctx.esp -= STACK_SIZE as u32 - 16;
        assert_eq!(s.schedule(Some(&ctx), 0), Decision::Switch(1));
        assert_eq!(s.exit_code(a), Some(STACK_OVERFLOW_EXIT_CODE));
    }

    #[test]
    fn starvation_is_reported() {
        let mut s = new_sched();
        serial::take_captured();
        assert_eq!(s.schedule(None, 0), Decision::Starved);
        if cfg!(not(feature = "no_logs")) {
            assert!(serial::take_captured().contains("starvation"));
        }
    }

    #[test]
    fn fpu_follows_the_faulting_block() {
        let mut s = new_sched();
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.schedule(None, 0);

        s.handle_fpu_fault().unwrap();
        assert_eq!(s.fpu_owner(), Some(0));
        assert!(!s.table[0].fpu.as_ref().unwrap().is_saved());

        // Segunda falha do mesmo dono não aloca nada
        let live = s.stacks().allocator().live();
        s.handle_fpu_fault().unwrap();
        assert_eq!(s.stacks().allocator().live(), live);

        tick(&mut s, 0);
        s.handle_fpu_fault().unwrap();
        assert_eq!(s.fpu_owner(), Some(1));
        assert!(s.table[0].fpu.as_ref().unwrap().is_saved());

        tick(&mut s, 0);
        s.handle_fpu_fault().unwrap();
        assert_eq!(s.fpu_owner(), Some(0));
        assert!(s.table[1].fpu.as_ref().unwrap().is_saved());
    }

    #[test]
    fn fpu_fault_without_memory_leaves_no_owner() {
        let mut s = Box::new(Scheduler::new(FakeArena::with_budget(1)));
        s.create_process(ENTRY, Privilege::User).unwrap();
        s.schedule(None, 0);
        assert_eq!(s.handle_fpu_fault(), Err(SchedError::FpuAllocFailed));
        assert_eq!(s.fpu_owner(), None);
        assert!(s.table[0].fpu.is_none());
    }

    #[test]
    fn pid_counter_wraps_around_live_blocks() {
        let mut s = new_sched();
        let first = s.create_process(ENTRY, Privilege::User).unwrap();
        assert_eq!(first, 1);

        s.next_pid = u32::MAX;
        let last = s.create_process(ENTRY, Privilege::User).unwrap();
        let wrapped = s.create_process(ENTRY, Privilege::User).unwrap();
        assert_eq!(last, u32::MAX);
        // 0 é reservado e 1 ainda está vivo.
        assert_eq!(wrapped, 2);
        assert_eq!(s.slot_of(first), Some(0));
        assert_eq!(s.slot_of(wrapped), Some(2));
    }

    #[test]
    fn dump_reports_mutex_counters() {
        let mut s = new_sched();
        s.create_process(ENTRY, Privilege::User).unwrap();
        serial::take_captured();
        s.dump();
        if cfg!(any(
            feature = "log_info",
            feature = "log_debug",
            feature = "log_trace"
        )) && cfg!(not(feature = "no_logs"))
        {
            let out = serial::take_captured();
            assert!(out.contains("Contenções="));
            assert!(out.contains("Unlocks de mutex livre="));
        }
    }

    #[test]
    fn exit_with_held_mutex_is_reported() {
        let _guard = high_slots();
        const SLOT: usize = MAX_PROCESSES - 2;

        let mut s = new_sched();
        for _ in 0..=SLOT {
            s.create_process(ENTRY, Privilege::User).unwrap();
        }
        s.cursor = Some(SLOT - 1);
        assert_eq!(s.schedule(None, 0), Decision::Switch(SLOT));

        lockdep::acquired_by(SLOT);
        assert_eq!(s.held_locks(SLOT), 1);
        serial::take_captured();
        s.exit_current(0).unwrap();
        assert_eq!(s.held_locks(SLOT), 0);
        if cfg!(not(feature = "no_logs")) {
            assert!(serial::take_captured().contains("mutex retido"));
        }
    }
}
