//! Constantes de configuração do Scheduler

use super::stack::OverflowPolicy;

/// Capacidade da tabela de blocos de controle.
pub const MAX_PROCESSES: usize = 256;

/// Tamanho da stack de cada thread (em bytes).
pub const STACK_SIZE: usize = 4096;

/// Alinhamento da base e do topo das stacks.
pub const STACK_ALIGN: usize = 16;

/// Uso de stack (em %) a partir do qual a stack é considerada insegura.
pub const STACK_SAFETY_PERCENT: usize = 90;

/// Política aplicada quando o uso de stack passa do limite.
pub const OVERFLOW_POLICY: OverflowPolicy = OverflowPolicy::Warn;

/// Código de saída registrado para blocos mortos por overflow de stack.
pub const STACK_OVERFLOW_EXIT_CODE: i32 = -1;

/// Prioridade da tarefa Idle
pub const PRIORITY_IDLE: u8 = 0;

/// Prioridade padrão de processos e threads
pub const PRIORITY_DEFAULT: u8 = 1;

/// O scheduler roda a cada N ticks do timer.
pub const SCHED_TICK_INTERVAL: u64 = 10;

/// Área de FXSAVE.
pub const FPU_STATE_SIZE: usize = 512;
pub const FPU_STATE_ALIGN: usize = 16;
