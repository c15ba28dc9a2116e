//! Erros do subsistema de execução.

/// Erros de processos, threads e do scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// Nenhuma linha livre na tabela de processos
    TableFull,
    /// O alocador não entregou memória para a stack
    StackAllocFailed,
    /// Tamanho de stack inválido (zero)
    InvalidStackSize,
    /// Stack inválida passada para destruição
    InvalidStack,
    /// O alocador não entregou memória para o estado de FPU
    FpuAllocFailed,
    /// Forma do entry point não combina com a presença de argumento
    InvalidEntry,
    /// Operação exige que o bloco seja o atual
    NotCurrent,
    /// A idle não pode dormir nem terminar
    IdleProtected,
    /// O bloco não tem payload de thread
    NoThread,
    /// Não há bloco atual
    NoCurrent,
}

impl SchedError {
    /// Retorna descrição legível do erro
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TableFull => "Tabela de processos cheia",
            Self::StackAllocFailed => "Falha ao alocar stack",
            Self::InvalidStackSize => "Tamanho de stack inválido",
            Self::InvalidStack => "Stack inválida",
            Self::FpuAllocFailed => "Falha ao alocar estado de FPU",
            Self::InvalidEntry => "Assinatura do entry point não combina com o argumento",
            Self::NotCurrent => "Bloco não é o atual",
            Self::IdleProtected => "A idle não pode dormir nem terminar",
            Self::NoThread => "Bloco sem payload de thread",
            Self::NoCurrent => "Nenhum bloco atual",
        }
    }
}

impl core::fmt::Display for SchedError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tipo Result do scheduler
pub type SchedResult<T> = Result<T, SchedError>;
