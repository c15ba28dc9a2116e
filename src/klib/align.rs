//! Alinhamento de endereços (potências de dois).

/// Alinha `val` para cima ao próximo múltiplo de `align`.
/// Retorna `None` em overflow.
#[inline(always)]
pub const fn align_up(val: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    match val.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}

/// Alinha `val` para baixo ao múltiplo anterior de `align`.
#[inline(always)]
pub const fn align_down(val: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    val & !(align - 1)
}

#[inline(always)]
pub const fn is_aligned(val: usize, align: usize) -> bool {
    val & (align - 1) == 0
}
