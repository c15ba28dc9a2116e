//! Payload de thread: entry point tipado, argumento, sono e código de retorno.

use super::state::ThreadState;
use crate::sched::error::{SchedError, SchedResult};
use alloc::string::String;

/// As quatro formas de entry point aceitas por `create_thread`.
#[derive(Clone, Copy)]
pub enum ThreadEntry {
    /// `fn()`
    Plain(fn()),
    /// `fn(&str)`
    WithArg(fn(&str)),
    /// `fn() -> i32`
    Status(fn() -> i32),
    /// `fn(&str) -> i32`
    StatusWithArg(fn(&str) -> i32),
}

impl ThreadEntry {
    /// A forma exige um argumento?
    pub const fn takes_arg(&self) -> bool {
        matches!(self, Self::WithArg(_) | Self::StatusWithArg(_))
    }

    /// Executa o entry point. Formas sem status retornam 0.
    pub fn invoke(self, arg: &str) -> i32 {
        match self {
            Self::Plain(f) => {
                f();
                0
            }
            Self::WithArg(f) => {
                f(arg);
                0
            }
            Self::Status(f) => f(),
            Self::StatusWithArg(f) => f(arg),
        }
    }
}

impl core::fmt::Debug for ThreadEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let shape = match self {
            Self::Plain(_) => "Plain",
            Self::WithArg(_) => "WithArg",
            Self::Status(_) => "Status",
            Self::StatusWithArg(_) => "StatusWithArg",
        };
        f.write_str(shape)
    }
}

/// Payload de thread, pertencente ao bloco de controle.
#[derive(Debug)]
pub struct Thread {
    pub entry: ThreadEntry,
    pub arg: Option<String>,
    /// Instante (ms) de acordar; válido apenas em `Sleeping`.
    pub wake_time: u64,
    pub state: ThreadState,
    pub return_code: i32,
}

impl Thread {
    /// Valida a combinação forma × argumento.
    pub fn new(entry: ThreadEntry, arg: Option<&str>) -> SchedResult<Self> {
        if entry.takes_arg() != arg.is_some() {
            crate::kerror!("(Thread) Entry point não combina com o argumento");
            return Err(SchedError::InvalidEntry);
        }
        Ok(Self {
            entry,
            arg: arg.map(String::from),
            wake_time: 0,
            state: ThreadState::Ready,
            return_code: 0,
        })
    }

    /// Pronta, ou dormindo com o prazo vencido.
    pub fn is_ready(&self, now_ms: u64) -> bool {
        match self.state {
            ThreadState::Ready | ThreadState::Running => true,
            ThreadState::Sleeping => now_ms >= self.wake_time,
            ThreadState::Terminated => false,
        }
    }

    /// Argumento como `&str` ("" para formas sem argumento).
    pub fn arg_str(&self) -> &str {
        self.arg.as_deref().unwrap_or("")
    }
}
