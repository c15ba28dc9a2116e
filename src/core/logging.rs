// =============================================================================
// KERNEL LOGGING - ZERO OVERHEAD
// =============================================================================
//
// Logs do núcleo de execução, filtrados em tempo de compilação por features.
//
// REGRAS:
// - SEM core::fmt nos caminhos quentes (scheduler roda com IRQs desligadas)
// - SEM alocação: apenas strings e valores imediatos impressos em hex
// - Destino: `drivers::serial` (COM1 no kernel, buffer por thread nos testes)
//
// NÍVEIS (feature mínima que ativa cada um):
// - ERROR / WARN / OK / FAIL : qualquer uma, exceto no_logs
// - INFO                     : log_info, log_debug, log_trace
// - DEBUG                    : log_debug, log_trace
// - TRACE                    : log_trace (cada decisão do scheduler)
//
// USO:
//   kinfo!("(Sched) Inicializado");
//   kwarn!("(Stack) Uso alto. pid=", pid);
//   klog!("pid=", pid, " eip=", eip); knl!();
//
// =============================================================================

pub const P_ERROR: &str = "\x1b[1;31m[ERRO]\x1b[0m ";
pub const P_WARN: &str = "\x1b[1;33m[WARN]\x1b[0m ";
pub const P_INFO: &str = "\x1b[32m[INFO]\x1b[0m ";
pub const P_DEBUG: &str = "\x1b[36m[DEBG]\x1b[0m ";
pub const P_TRACE: &str = "\x1b[35m[TRAC]\x1b[0m ";
pub const P_OK: &str = "\x1b[32m[OK]\x1b[0m ";
pub const P_FAIL: &str = "\x1b[1;31m[FAIL]\x1b[0m ";

/// Emite uma linha completa: prefixo, mensagem e (opcionalmente) um valor hex.
#[doc(hidden)]
#[macro_export]
macro_rules! __klog_line {
    ($prefix:expr, $msg:expr) => {{
        $crate::drivers::serial::emit_str($prefix);
        $crate::drivers::serial::emit_str($msg);
        $crate::drivers::serial::emit_nl();
    }};
    ($prefix:expr, $msg:expr, $val:expr) => {{
        $crate::drivers::serial::emit_str($prefix);
        $crate::drivers::serial::emit_str($msg);
        $crate::drivers::serial::emit_hex($val as u64);
        $crate::drivers::serial::emit_nl();
    }};
}

// -----------------------------------------------------------------------------
// ERROR / WARN
// -----------------------------------------------------------------------------

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kerror {
    ($($arg:expr),+ $(,)?) => {
        $crate::__klog_line!($crate::core::logging::P_ERROR, $($arg),+)
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)*) => {{}};
}

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kwarn {
    ($($arg:expr),+ $(,)?) => {
        $crate::__klog_line!($crate::core::logging::P_WARN, $($arg),+)
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kwarn {
    ($($t:tt)*) => {{}};
}

// -----------------------------------------------------------------------------
// INFO
// -----------------------------------------------------------------------------

#[cfg(all(
    not(feature = "no_logs"),
    any(feature = "log_info", feature = "log_debug", feature = "log_trace")
))]
#[macro_export]
macro_rules! kinfo {
    ($($arg:expr),+ $(,)?) => {
        $crate::__klog_line!($crate::core::logging::P_INFO, $($arg),+)
    };
}

#[cfg(not(all(
    not(feature = "no_logs"),
    any(feature = "log_info", feature = "log_debug", feature = "log_trace")
)))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)*) => {{}};
}

// -----------------------------------------------------------------------------
// DEBUG
// -----------------------------------------------------------------------------

#[cfg(all(
    not(feature = "no_logs"),
    any(feature = "log_debug", feature = "log_trace")
))]
#[macro_export]
macro_rules! kdebug {
    ($($arg:expr),+ $(,)?) => {
        $crate::__klog_line!($crate::core::logging::P_DEBUG, $($arg),+)
    };
}

#[cfg(not(all(
    not(feature = "no_logs"),
    any(feature = "log_debug", feature = "log_trace")
)))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)*) => {{}};
}

// -----------------------------------------------------------------------------
// TRACE
// -----------------------------------------------------------------------------

#[cfg(all(not(feature = "no_logs"), feature = "log_trace"))]
#[macro_export]
macro_rules! ktrace {
    ($($arg:expr),+ $(,)?) => {
        $crate::__klog_line!($crate::core::logging::P_TRACE, $($arg),+)
    };
}

#[cfg(not(all(not(feature = "no_logs"), feature = "log_trace")))]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)*) => {{}};
}

// -----------------------------------------------------------------------------
// AUXILIARES
// -----------------------------------------------------------------------------

/// klog! - Fragmento de linha sem prefixo (string, hex, string, hex).
/// Termine a linha com `knl!()`.
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! klog {
    ($msg:expr) => {{
        $crate::drivers::serial::emit_str($msg);
    }};
    ($msg:expr, $val:expr) => {{
        $crate::drivers::serial::emit_str($msg);
        $crate::drivers::serial::emit_hex($val as u64);
    }};
    ($msg1:expr, $val1:expr, $($rest:expr),+) => {{
        $crate::drivers::serial::emit_str($msg1);
        $crate::drivers::serial::emit_hex($val1 as u64);
        $crate::klog!($($rest),+);
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! klog {
    ($($t:tt)*) => {{}};
}

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! knl {
    () => {{
        $crate::drivers::serial::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! knl {
    () => {{}};
}

/// kok! - Sucesso (usado pelos self-tests).
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kok {
    ($msg:expr) => {
        $crate::__klog_line!($crate::core::logging::P_OK, $msg)
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kok {
    ($($t:tt)*) => {{}};
}

/// kfail! - Falha (usado pelos self-tests).
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kfail {
    ($msg:expr) => {
        $crate::__klog_line!($crate::core::logging::P_FAIL, $msg)
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kfail {
    ($($t:tt)*) => {{}};
}

#[cfg(all(test, not(feature = "no_logs")))]
mod tests {
    use crate::drivers::serial;

    #[test]
    fn error_line_has_prefix_and_hex_value() {
        serial::take_captured();
        crate::kerror!("(Test) valor=", 0x2Au32);
        let out = serial::take_captured();
        assert!(out.starts_with(super::P_ERROR));
        assert!(out.contains("(Test) valor=0x2A"));
        assert!(out.ends_with("\r\n"));
    }

    #[test]
    fn klog_chains_fragments() {
        serial::take_captured();
        crate::klog!("a=", 1u32, " b=", 0xFFu32);
        crate::knl!();
        assert_eq!(serial::take_captured(), "a=0x1 b=0xFF\r\n");
    }
}
