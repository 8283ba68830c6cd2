//! Rescaling of channel values between bit widths.

/// Rescale an `s1`-bit unsigned value to `s2` bits.
///
/// Downscaling truncates. Upscaling replicates the source bits to fill
/// the wider field (multiply by the repeating-bit constant, then trim),
/// so 0 maps to 0 and the maximum maps to the maximum at every width
/// pair. Valid for channel widths 1..=8.
#[inline]
pub fn scale(s1: u32, s2: u32, val: u32) -> u32 {
    debug_assert!((1..=8).contains(&s1) && (1..=8).contains(&s2));
    debug_assert!(val < 1 << s1);
    if s2 <= s1 {
        return val >> (s1 - s2);
    }
    let reps = (s2 + s1 - 1) / s1;
    let mut coef: u64 = 0;
    for i in 0..reps {
        coef |= 1u64 << (i * s1);
    }
    // replication overshoots to reps*s1 bits, trim back down to s2
    ((val as u64 * coef) >> (reps * s1 - s2)) as u32
}
