//! Self-tests do núcleo de execução (feature `self_test`).
//!
//! Rodam no boot, antes de `sched::start`, com o heap já inicializado.

use crate::klib::test_framework::SuiteSummary;

/// Executa todas as suites e devolve o placar agregado.
pub fn run_all() -> SuiteSummary {
    crate::kinfo!("(SelfTest) Iniciando suites");

    let mut total = SuiteSummary::default();
    total.merge(crate::sched::test::run_sched_tests());
    total.merge(crate::sync::test::run_sync_tests());

    if total.all_passed() {
        crate::kinfo!("(SelfTest) Todas as suites passaram. casos=", total.passed);
    } else {
        crate::kerror!("(SelfTest) Falhas=", total.failed);
    }
    total
}
