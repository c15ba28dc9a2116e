//! Tipos de Erro do Subsistema de Memória

/// Erros do alocador bruto usado pelo núcleo de execução.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmError {
    /// Heap sem bloco livre que satisfaça o layout
    OutOfMemory,
    /// Tamanho zero ou layout impossível
    InvalidSize,
    /// Região passada a `init` inválida (nula ou vazia)
    InvalidRegion,
}

impl MmError {
    /// Retorna descrição legível do erro
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfMemory => "OOM: heap sem bloco livre",
            Self::InvalidSize => "Tamanho inválido",
            Self::InvalidRegion => "Região de heap inválida",
        }
    }
}

impl core::fmt::Display for MmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tipo Result específico para operações de memória
pub type MmResult<T> = Result<T, MmError>;
