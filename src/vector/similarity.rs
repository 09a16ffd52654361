//! Vector Similarity Functions
//!
//! Dot product and unit normalization over `f32` slices.

/// Dot product of two equal-length vectors.
///
/// Accumulates four independent lanes so the compiler can vectorize the
/// main loop; the tail is added afterwards.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let a_chunks = a.chunks_exact(4);
    let b_chunks = b.chunks_exact(4);
    let tail: f32 = a_chunks
        .remainder()
        .iter()
        .zip(b_chunks.remainder())
        .map(|(x, y)| x * y)
        .sum();

    let mut lanes = [0.0f32; 4];
    for (x, y) in a_chunks.zip(b_chunks) {
        for ((lane, x), y) in lanes.iter_mut().zip(x).zip(y) {
            *lane += x * y;
        }
    }

    lanes.iter().sum::<f32>() + tail
}

/// Sum of squared components
#[inline]
pub fn squared_magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum()
}

/// Normalize a vector in place to unit Euclidean length.
///
/// Returns `false`, leaving `v` untouched, when the squared magnitude is not
/// a positive finite number (all-zero vectors, NaN or overflowing components).
pub fn normalize(v: &mut [f32]) -> bool {
    let sum = squared_magnitude(v);
    if !(sum > 0.0 && sum.is_finite()) {
        return false;
    }

    let magnitude = sum.sqrt();
    for x in v.iter_mut() {
        *x /= magnitude;
    }
    true
}

/// Add `src` into `dst` component-wise
#[inline]
pub fn accumulate(dst: &mut [f32], src: &[f32]) {
    debug_assert_eq!(dst.len(), src.len(), "Vector dimensions must match");

    for (d, s) in dst.iter_mut().zip(src) {
        *d += s;
    }
}
