//! Ponto de entrada comum das threads.
//!
//! O contexto inicial de uma thread aponta para o trampolim da plataforma com
//! EAX = endereço do seu `Thread`. O trampolim chama [`thread_main`], que roda a
//! função com o argumento guardado e termina a thread com o valor devolvido.
//!
//! Roda no privilégio da thread: nada aqui aloca nem toca no heap.

use crate::sched::task::Thread;

/// `thread` é o payload do bloco atual; ele só é liberado no reap, depois
/// do `exit_thread` abaixo.
pub extern "C" fn thread_main(thread: *const Thread) -> ! {
    // SAFETY: ver acima; o payload vive mais que esta chamada.
    let thread: &Thread = unsafe { &*thread };
    let code = run(thread);
    crate::sched::exit_thread(code)
}

/// Roda a função da thread sobre o argumento emprestado do payload.
fn run(thread: &Thread) -> i32 {
    thread.entry.invoke(thread.arg_str())
}
