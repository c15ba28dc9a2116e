//! Stubs de entrada/saída do scheduler (i686).
//!
//! Este arquivo é a única fronteira entre o layout binário do
//! `ExecutionContext` e o assembly. Os offsets abaixo são os mesmos verificados
//! em `sched::context::frame` (asserts de compilação).
//!
//! ```text
//! offset  campo            origem
//! 0..32   edi..eax         PUSHA
//! 32      cs   (u16)       frame de hardware
//! 34..40  ds, es, fs, gs   registradores de segmento
//! 42      ss   (u16)       frame (ring 3) ou SS atual (ring 0)
//! 44      eip              frame de hardware
//! 48      eflags           frame de hardware
//! 52      error_code       sempre 0 (IRQ0 / int 0x81 não empilham código)
//! ```
//!
//! Os stubs são instalados na IDT pela camada de interrupções:
//! - `sched_timer_stub` no vetor 32 (IRQ0, PIT)
//! - `sched_yield_stub` no vetor 0x81 (gate DPL 3, usado por yield/sleep/exit)

use crate::sched::context::ExecutionContext;
use core::arch::global_asm;

/// Tamanho da stack usada para entradas vindas do Ring 3 (TSS.ESP0).
const INTERRUPT_STACK_SIZE: usize = 16 * 1024;

#[repr(C, align(16))]
struct InterruptStack([u8; INTERRUPT_STACK_SIZE]);

static mut INTERRUPT_STACK: InterruptStack = InterruptStack([0; INTERRUPT_STACK_SIZE]);

extern "C" {
    /// Fornecido pela configuração de GDT/TSS: grava ESP0 no TSS.
    fn tss_set_kernel_stack(esp0: u32);

    /// Restaura um contexto salvo e executa IRETD. Nunca retorna.
    fn context_restore(ctx: *const ExecutionContext) -> !;

    pub fn sched_timer_stub();
    pub fn sched_yield_stub();

    /// Primeira instrução de toda thread: EAX = ponteiro para o payload.
    fn sched_thread_start() -> !;
}

global_asm!(
    r#"
.global sched_timer_stub
sched_timer_stub:
    sub esp, 24
    pusha
    mov ebx, offset {timer}
    jmp sched_save_common

.global sched_yield_stub
sched_yield_stub:
    sub esp, 24
    pusha
    mov ebx, offset {yield_}
    jmp sched_save_common

// Monta o ExecutionContext no topo da stack.
// [esp+0..32] PUSHA, [esp+32..56] cauda do registro,
// [esp+56] eip, [esp+60] cs, [esp+64] eflags, [esp+68] esp3, [esp+72] ss3
sched_save_common:
    mov eax, [esp + 56]
    mov [esp + 44], eax
    mov eax, [esp + 60]
    mov word ptr [esp + 32], ax
    mov eax, [esp + 64]
    mov [esp + 48], eax
    mov dword ptr [esp + 52], 0
    mov word ptr [esp + 34], ds
    mov word ptr [esp + 36], es
    mov word ptr [esp + 38], fs
    mov word ptr [esp + 40], gs

    test dword ptr [esp + 60], 3
    jz 2f
    // Veio do Ring 3: ESP/SS do usuário estão no frame
    mov eax, [esp + 68]
    mov [esp + 12], eax
    mov eax, [esp + 72]
    mov word ptr [esp + 42], ax
    jmp 3f
2:
    // Veio do Ring 0: ESP anterior fica logo acima do frame de 12 bytes
    lea eax, [esp + 68]
    mov [esp + 12], eax
    mov word ptr [esp + 42], ss
3:
    mov ax, 0x10
    mov ds, ax
    mov es, ax
    mov fs, ax
    mov gs, ax

    mov eax, esp
    push eax
    call ebx
    add esp, 4

    // Sem troca: volta para o próprio contexto (possivelmente alterado)
    mov eax, esp
    push eax
    call context_restore

.global context_restore
context_restore:
    mov eax, [esp + 4]
    movzx ecx, word ptr [eax + 32]
    test ecx, 3
    jz 4f

    // Ring 3: frame IRETD completo na stack atual (kernel)
    movzx edx, word ptr [eax + 42]
    push edx
    push dword ptr [eax + 12]
    push dword ptr [eax + 48]
    push ecx
    push dword ptr [eax + 44]
    jmp 5f
4:
    // Ring 0: frame IRETD montado na stack da própria thread
    mov esp, [eax + 12]
    push dword ptr [eax + 48]
    push ecx
    push dword ptr [eax + 44]
5:
    mov cx, word ptr [eax + 34]
    mov ds, cx
    mov cx, word ptr [eax + 36]
    mov es, cx
    mov cx, word ptr [eax + 38]
    mov fs, cx
    mov cx, word ptr [eax + 40]
    mov gs, cx

    mov edi, [eax + 0]
    mov esi, [eax + 4]
    mov ebp, [eax + 8]
    mov ebx, [eax + 16]
    mov edx, [eax + 20]
    mov ecx, [eax + 24]
    mov eax, [eax + 28]
    iretd

.global sched_thread_start
sched_thread_start:
    sub esp, 12
    push eax
    call {thread_main}
    ud2
"#,
    timer = sym sched_timer_entry,
    yield_ = sym sched_yield_entry,
    thread_main = sym crate::sched::core::entry::thread_main,
);

/// Chamado por `sched_timer_stub` com o contexto interrompido.
extern "C" fn sched_timer_entry(ctx: *mut ExecutionContext) {
    // SAFETY: o stub passa o registro recém-montado na stack de interrupção.
    let ctx = unsafe { ExecutionContext::from_raw(ctx) };
    crate::drivers::timer::pit::on_tick(ctx);
}

/// Chamado por `sched_yield_stub`: EAX = número do pedido, ECX = argumento.
extern "C" fn sched_yield_entry(ctx: *mut ExecutionContext) {
    // SAFETY: idem ao timer.
    let ctx = unsafe { ExecutionContext::from_raw(ctx) };
    crate::sched::handle_request_frame(ctx);
}

/// Transfere o controle para `ctx`.
///
/// # Safety
/// Interrupções desabilitadas; `ctx` deve permanecer válido até o IRETD
/// (apontar para a tabela de processos estática satisfaz isso).
pub unsafe fn restore(ctx: *const ExecutionContext) {
    context_restore(ctx)
}

/// Endereço do trampolim que inicia threads.
pub fn trampoline_address() -> u32 {
    sched_thread_start as usize as u32
}

/// Configura a stack usada pelo hardware ao entrar no kernel vindo do Ring 3.
pub fn install_interrupt_stack() {
    // SAFETY: só o endereço é usado; a stack pertence ao hardware.
    let top = unsafe { core::ptr::addr_of!(INTERRUPT_STACK) as usize + INTERRUPT_STACK_SIZE };
    crate::kdebug!("(Arch) ESP0 de interrupção=", top);
    unsafe { tss_set_kernel_stack(top as u32) };
}
