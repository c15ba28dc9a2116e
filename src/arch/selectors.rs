//! Seletores de segmento fornecidos pela configuração da GDT.
//!
//! A GDT em si é construída fora deste núcleo; aqui ficam apenas os valores
//! que o scheduler escreve em contextos novos. Layout da GDT:
//! 0: Null, 1: Kernel Code, 2: Kernel Data, 3: User Code, 4: User Data.

/// Seletor de segmento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SegmentSelector(pub u16);

impl SegmentSelector {
    pub const fn new(index: u16, rpl: u8) -> Self {
        Self((index << 3) | (rpl as u16))
    }

    /// Requested Privilege Level (bits 0-1).
    pub const fn rpl(self) -> u8 {
        (self.0 & 0b11) as u8
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

pub const KERNEL_CODE_SEL: SegmentSelector = SegmentSelector::new(1, 0); // 0x08
pub const KERNEL_DATA_SEL: SegmentSelector = SegmentSelector::new(2, 0); // 0x10
pub const USER_CODE_SEL: SegmentSelector = SegmentSelector::new(3, 3); // 0x1B
pub const USER_DATA_SEL: SegmentSelector = SegmentSelector::new(4, 3); // 0x23
