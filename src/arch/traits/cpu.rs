//! Interface Abstrata de CPU (HAL).
//! Define as operações que o scheduler precisa de qualquer backend
//! (x86 real ou a CPU simulada dos testes de host).

pub trait CpuOps {
    /// Para a execução da CPU até a próxima interrupção (instrução HLT).
    /// Economiza energia em loops ociosos.
    fn halt();

    /// Desabilita interrupções globalmente (CLI).
    /// Crítico para seções atômicas do scheduler.
    fn disable_interrupts();

    /// Habilita interrupções globalmente (STI).
    fn enable_interrupts();

    /// Verifica se as interrupções estão habilitadas (EFLAGS.IF).
    fn are_interrupts_enabled() -> bool;

    /// Dica para a CPU que estamos em um spinloop (PAUSE).
    fn relax() {
        ::core::hint::spin_loop();
    }

    /// Entrega um pedido ao scheduler com o contexto completo salvo.
    ///
    /// Em x86 dispara o vetor de yield (`int 0x81`) com `number` em EAX e
    /// `arg` em ECX; o stub de entrada captura o `ExecutionContext`
    /// exatamente como no timer. Seguro a partir do Ring 3.
    fn raise_request(number: u32, arg: u32);

    /// Marca a FPU como "não disponível" (CR0.TS = 1).
    /// A próxima instrução de ponto flutuante gera #NM.
    fn fpu_set_trap();

    /// Limpa CR0.TS (instrução CLTS).
    fn fpu_clear_trap();

    /// Salva o estado FPU/SSE no buffer (FXSAVE, 512 bytes, alinhado a 16).
    ///
    /// # Safety
    /// `area` deve apontar para 512 bytes graváveis alinhados a 16.
    unsafe fn fpu_save(area: *mut u8);

    /// Restaura o estado FPU/SSE do buffer (FXRSTOR).
    ///
    /// # Safety
    /// `area` deve conter um estado salvo anteriormente por `fpu_save`.
    unsafe fn fpu_restore(area: *const u8);

    /// Reinicializa a FPU (FNINIT).
    fn fpu_init();

    /// Entra em loop infinito de halt com interrupções desabilitadas.
    /// Usado em pânicos irrecuperáveis.
    fn hang() -> ! {
        Self::disable_interrupts();
        loop {
            Self::halt();
        }
    }
}
