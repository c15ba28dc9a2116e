//! Estados de processos e threads

use crate::arch::selectors::{
    SegmentSelector, KERNEL_CODE_SEL, KERNEL_DATA_SEL, USER_CODE_SEL, USER_DATA_SEL,
};

/// Estado de um bloco de controle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Pronto para executar
    Ready,
    /// Executando (no máximo um, sempre o `current`)
    Running,
    /// Reservado: nada bloqueia hoje
    Blocked,
    /// Terminado; a linha é reutilizável quando não há payload
    Terminated,
}

impl ProcessState {
    /// Verifica se pode ser escalonado
    pub const fn is_runnable(self) -> bool {
        matches!(self, Self::Ready | Self::Running)
    }
}

/// Estado do payload de thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    Ready,
    Running,
    /// Dormindo até `wake_time`
    Sleeping,
    /// Entry point retornou; aguardando reap
    Terminated,
}

/// Nível de privilégio em que o bloco executa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Ring 0 (idle, threads de kernel)
    Kernel,
    /// Ring 3
    User,
}

impl Privilege {
    pub const fn code_selector(self) -> SegmentSelector {
        match self {
            Self::Kernel => KERNEL_CODE_SEL,
            Self::User => USER_CODE_SEL,
        }
    }

    pub const fn data_selector(self) -> SegmentSelector {
        match self {
            Self::Kernel => KERNEL_DATA_SEL,
            Self::User => USER_DATA_SEL,
        }
    }
}
