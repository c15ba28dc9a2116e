//! Contexto de execução salvo/restaurado pelos stubs de interrupção.

pub mod frame;

pub use frame::{EFlags, ExecutionContext, CONTEXT_LAYOUT_VERSION};
