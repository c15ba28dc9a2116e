//! Bloco de controle (PCB): uma linha da tabela de processos.

use super::fpu::FpuArea;
use super::state::{Privilege, ProcessState};
use super::thread::Thread;
use crate::sched::context::ExecutionContext;
use crate::sched::stack::Stack;
use alloc::boxed::Box;

/// Identificador de processo. Crescente a partir de 1; depois de `u32::MAX`
/// o contador dá a volta, pulando o 0 e os pids ainda presentes na tabela.
pub type Pid = u32;

pub struct ControlBlock {
    pub pid: Pid,
    pub state: ProcessState,
    /// 0 = idle, >= 1 = normal
    pub priority: u8,
    pub privilege: Privilege,
    pub stack: Option<Stack>,
    pub context: ExecutionContext,
    /// Estado FXSAVE, alocado na primeira #NM
    pub fpu: Option<FpuArea>,
    pub thread: Option<Box<Thread>>,
    /// Código de saída, visível até a linha ser reutilizada
    pub exit_code: Option<i32>,
    /// Uso de stack passou do limite em alguma passagem
    pub overflow: bool,
    /// Quantas vezes este bloco foi escolhido pelo scheduler
    pub switches: u64,
}

impl ControlBlock {
    /// Linha livre.
    pub const EMPTY: ControlBlock = ControlBlock {
        pid: 0,
        state: ProcessState::Terminated,
        priority: 0,
        privilege: Privilege::User,
        stack: None,
        context: ExecutionContext::ZERO,
        fpu: None,
        thread: None,
        exit_code: None,
        overflow: false,
        switches: 0,
    };

    /// Uma linha é livre quando está terminada e sem payload.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.state == ProcessState::Terminated && self.thread.is_none()
    }

    /// Elegível para seleção em `now_ms`: executável e, se houver payload,
    /// com a thread pronta.
    pub fn is_eligible(&self, now_ms: u64) -> bool {
        self.state.is_runnable() && self.thread.as_ref().map_or(true, |t| t.is_ready(now_ms))
    }
}
