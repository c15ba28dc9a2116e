//! # Multitasking & Scheduler Subsystem
//!
//! Transforma a CPU única em várias linhas de execução: processos e threads
//! em uma tabela fixa, escolhidos em round-robin a cada
//! `SCHED_TICK_INTERVAL` ticks do PIT ou quando cedem a CPU.
//!
//! ## Camadas
//! - `core::Scheduler`: decisão pura (tabela, `current`, stacks, FPU). Não
//!   toca em hardware e é testado no host.
//! - este módulo: a instância global, travada por um `Spinlock` (que mascara
//!   interrupções), e a ponte com `arch` (restore de contexto, pedidos via
//!   int 0x81).
//!
//! ## Entradas
//! 1. **Preemptiva:** `drivers::timer::pit::on_tick` → [`schedule`] com o
//!    contexto interrompido.
//! 2. **Voluntária:** [`yield_now`], [`sleep`] e [`exit_thread`] levantam o
//!    vetor 0x81; o stub captura o contexto completo e chama
//!    [`handle_request_frame`].
//!
//! Depois de uma decisão o slot atual é publicado em `lockdep`, que o `Mutex`
//! lê sem travar nada.

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod lockdep;
pub mod request;
pub mod stack;
pub mod task;


#[cfg(test)]
pub(crate) mod testing;

pub use self::core::{Decision, Scheduler};
pub use context::ExecutionContext;
pub use error::{SchedError, SchedResult};
pub use request::Request;
pub use task::{Pid, Privilege, ThreadEntry};

use self::core::idle_task_entry;
use crate::arch::{platform, Cpu, CpuOps};
use crate::core::time::now_ms;
use crate::mm::KernelHeap;
use crate::sync::{Spinlock, SpinlockGuard};

/// A instância única do scheduler.
static SCHEDULER: Spinlock<Scheduler<KernelHeap>> = Spinlock::new(Scheduler::new(KernelHeap));

type Locked = SpinlockGuard<'static, Scheduler<KernelHeap>>;

// =============================================================================
// INICIALIZAÇÃO E CRIAÇÃO
// =============================================================================

/// Publica a stack de interrupção e cria a idle.
pub fn init() -> SchedResult<Pid> {
    crate::kinfo!("(Sched) Inicializando scheduler...");
    platform::install_interrupt_stack();
    let pid = SCHEDULER
        .lock()
        .create_idle(idle_task_entry as usize as u32)?;
    crate::kinfo!("(Sched) Scheduler inicializado. idle pid=", pid);
    Ok(pid)
}

/// Processo de usuário começando em `entry`.
pub fn create_process(entry: extern "C" fn() -> !) -> SchedResult<Pid> {
    create_process_with(entry, Privilege::User)
}

pub fn create_process_with(entry: extern "C" fn() -> !, privilege: Privilege) -> SchedResult<Pid> {
    SCHEDULER
        .lock()
        .create_process(entry as usize as u32, privilege)
}

/// Thread de usuário. `arg` é obrigatório exatamente para as formas que o recebem.
pub fn create_thread(entry: ThreadEntry, arg: Option<&str>) -> SchedResult<Pid> {
    create_thread_with(entry, arg, Privilege::User)
}

pub fn create_thread_with(
    entry: ThreadEntry,
    arg: Option<&str>,
    privilege: Privilege,
) -> SchedResult<Pid> {
    let trampoline = platform::trampoline_address();
    SCHEDULER
        .lock()
        .create_thread(trampoline, entry, arg, privilege)
}

// =============================================================================
// ESCALONAMENTO
// =============================================================================

/// Uma passagem do scheduler.
///
/// `ctx` é o contexto interrompido (timer). `None` só serve para o primeiro
/// despacho ou depois que o bloco atual terminou.
pub fn schedule(ctx: Option<&mut ExecutionContext>) {
    let mut sched = SCHEDULER.lock();
    let decision = sched.schedule(ctx.as_deref(), now_ms());
    dispatch(sched, decision);
}

/// Corpo do vetor 0x81: decodifica o pedido dos registradores e o aplica.
pub fn handle_request_frame(ctx: &mut ExecutionContext) {
    let request = match Request::decode(ctx.eax, ctx.ecx) {
        Some(request) => request,
        None => {
            crate::kwarn!("(Sched) Pedido desconhecido. eax=", ctx.eax);
            Request::Yield
        }
    };

    let mut sched = SCHEDULER.lock();
    let decision = sched.service(request, Some(&*ctx), now_ms());
    dispatch(sched, decision);
}

/// Publica o bloco atual e, se houver troca, restaura o contexto escolhido.
fn dispatch(sched: Locked, decision: Decision) {
    lockdep::publish_current(sched.current().zip(sched.current_pid()));

    match decision {
        Decision::Stay => {}
        Decision::Switch(slot) => {
            let target = sched.context_ptr(slot);
            Cpu::fpu_set_trap();
            // Interrupções voltam com o EFLAGS restaurado.
            sched.release_masked();
            // SAFETY: `target` aponta para a tabela estática; interrupções
            // continuam mascaradas até o IRETD.
            unsafe { platform::restore(target) };
        }
        Decision::Starved => {
            if sched.current().is_none() {
                drop(sched);
                panic!("(Sched) Nenhum bloco executável");
            }
        }
    }
}

/// Primeiro despacho do kernel. Não retorna.
pub fn start() -> ! {
    crate::kinfo!("(Sched) Despachando o primeiro bloco");
    schedule(None);
    Cpu::hang()
}

// =============================================================================
// PEDIDOS VOLUNTÁRIOS
// =============================================================================

fn raise(request: Request) {
    let (number, arg) = request.encode();
    Cpu::raise_request(number, arg);
}

/// Cede a CPU.
pub fn yield_now() {
    raise(Request::Yield);
}

/// Dorme por pelo menos `ms` milissegundos.
pub fn sleep(ms: u32) {
    raise(Request::Sleep(ms));
}

/// Termina a thread atual com `code`.
pub fn exit_thread(code: i32) -> ! {
    raise(Request::Exit(code));
    loop {
        Cpu::relax();
    }
}

// =============================================================================
// CONSULTAS
// =============================================================================

/// Pid do bloco atual, sem travar o scheduler.
pub fn current_pid() -> Option<Pid> {
    lockdep::current_pid()
}

/// Código de saída de um bloco terminado (até a linha ser reutilizada).
pub fn exit_code(pid: Pid) -> Option<i32> {
    SCHEDULER.lock().exit_code(pid)
}

/// Corpo do handler de #NM.
pub fn handle_fpu_fault() {
    if let Err(e) = SCHEDULER.lock().handle_fpu_fault() {
        crate::kerror!(e.as_str());
    }
}

/// Tabela de processos na serial.
pub fn dump() {
    SCHEDULER.lock().dump();
}
