//! Pedidos voluntários ao scheduler (yield / sleep / exit).
//!
//! Viajam pelo vetor 0x81 como uma syscall: EAX = número, ECX = argumento.
//! Assim funcionam a partir do Ring 3 e chegam ao scheduler com o contexto
//! completo capturado pelo stub, exatamente como o tick do timer.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Yield,
    /// Dormir por N milissegundos
    Sleep(u32),
    /// Terminar a thread atual com o código dado
    Exit(i32),
}

impl Request {
    pub const YIELD: u32 = 0;
    pub const SLEEP: u32 = 1;
    pub const EXIT: u32 = 2;

    /// (EAX, ECX)
    pub const fn encode(self) -> (u32, u32) {
        match self {
            Self::Yield => (Self::YIELD, 0),
            Self::Sleep(ms) => (Self::SLEEP, ms),
            Self::Exit(code) => (Self::EXIT, code as u32),
        }
    }

    pub const fn decode(number: u32, arg: u32) -> Option<Self> {
        match number {
            Self::YIELD => Some(Self::Yield),
            Self::SLEEP => Some(Self::Sleep(arg)),
            Self::EXIT => Some(Self::Exit(arg as i32)),
            _ => None,
        }
    }
}
