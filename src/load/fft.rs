use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

use super::FftLoadLevel;

const MAX_SIZE: usize = 128;

/// Complex sample for the FFT workload.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FftComplex {
    pub re: f64,
    pub im: f64,
}

impl FftComplex {
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

impl Add for FftComplex {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for FftComplex {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for FftComplex {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

/// Iterative radix-2 Cooley-Tukey transform, in place.
///
/// `data.len()` must be a power of two. The forward direction uses a positive
/// angle; the inverse negates it and scales by `1/N`. Twiddles are advanced
/// by repeated multiplication rather than recomputed per index.
pub fn transform(data: &mut [FftComplex], inverse: bool) {
    let n = data.len();
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            data.swap(i, j);
        }
    }

    let sign = if inverse { -1.0 } else { 1.0 };
    let mut len = 2;
    while len <= n {
        let angle = 2.0 * PI / len as f64 * sign;
        let w_len = FftComplex::new(angle.cos(), angle.sin());
        let half = len / 2;

        for block in data.chunks_exact_mut(len) {
            let mut w = FftComplex::new(1.0, 0.0);
            for k in 0..half {
                let u = block[k];
                let v = block[k + half] * w;
                block[k] = u + v;
                block[k + half] = u - v;
                w = w * w_len;
            }
        }
        len <<= 1;
    }

    if inverse {
        let scale = n as f64;
        for c in data.iter_mut() {
            c.re /= scale;
            c.im /= scale;
        }
    }
}

/// One period of a sine wave as the real part, zero imaginary part.
pub fn sine_signal(buf: &mut [FftComplex]) {
    let n = buf.len() as f64;
    for (i, c) in buf.iter_mut().enumerate() {
        *c = FftComplex::new((2.0 * PI * i as f64 / n).sin(), 0.0);
    }
}

/// Runs `repeats` forward/inverse round trips at the level's size.
#[inline]
pub fn run_fft_load(level: FftLoadLevel) {
    let profile = level.profile();
    let mut buf = [FftComplex::default(); MAX_SIZE];
    let data = &mut buf[..profile.size];

    sine_signal(data);
    for _ in 0..profile.repeats {
        transform(data, false);
        transform(data, true);
    }
    std::hint::black_box(&buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    fn pseudo_signal(n: usize, seed: u64) -> Vec<FftComplex> {
        let mut x = seed;
        (0..n)
            .map(|_| {
                x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let re = ((x >> 11) as f64 / (1u64 << 53) as f64) * 200.0 - 100.0;
                x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let im = ((x >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0;
                FftComplex::new(re, im)
            })
            .collect()
    }

    #[test]
    fn test_round_trip_supported_sizes() {
        for &n in &[64usize, 128] {
            for seed in 1..6 {
                let original = pseudo_signal(n, seed);
                let mut data = original.clone();
                transform(&mut data, false);
                transform(&mut data, true);
                for (i, (got, want)) in data.iter().zip(&original).enumerate() {
                    assert!(close(got.re, want.re), "n={} i={} re {} vs {}", n, i, got.re, want.re);
                    assert!(close(got.im, want.im), "n={} i={} im {} vs {}", n, i, got.im, want.im);
                }
            }
        }
    }

    #[test]
    fn test_round_trip_sine() {
        let mut data = vec![FftComplex::default(); 64];
        sine_signal(&mut data);
        let original = data.clone();
        for _ in 0..8 {
            transform(&mut data, false);
            transform(&mut data, true);
        }
        for (got, want) in data.iter().zip(&original) {
            assert!((got.re - want.re).abs() < 1e-9);
            assert!(got.im.abs() < 1e-9);
        }
    }

    #[test]
    fn test_sine_spectrum_peaks() {
        let n = 128;
        let mut data = vec![FftComplex::default(); n];
        sine_signal(&mut data);
        transform(&mut data, false);
        for (k, c) in data.iter().enumerate() {
            let mag = (c.re * c.re + c.im * c.im).sqrt();
            if k == 1 || k == n - 1 {
                assert!((mag - n as f64 / 2.0).abs() < 1e-9, "bin {} magnitude {}", k, mag);
            } else {
                assert!(mag < 1e-9, "bin {} magnitude {}", k, mag);
            }
        }
    }

    #[test]
    fn test_impulse_is_flat() {
        let mut data = vec![FftComplex::default(); 64];
        data[0] = FftComplex::new(1.0, 0.0);
        transform(&mut data, false);
        for c in &data {
            assert!((c.re - 1.0).abs() < 1e-12);
            assert!(c.im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_trivial_sizes_untouched() {
        let mut one = vec![FftComplex::new(3.0, -2.0)];
        transform(&mut one, true);
        assert_eq!(one[0], FftComplex::new(3.0, -2.0));

        let mut empty: Vec<FftComplex> = Vec::new();
        transform(&mut empty, false);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_complex_arithmetic() {
        let a = FftComplex::new(1.0, 2.0);
        let b = FftComplex::new(3.0, -1.0);
        assert_eq!(a + b, FftComplex::new(4.0, 1.0));
        assert_eq!(a - b, FftComplex::new(-2.0, 3.0));
        assert_eq!(a * b, FftComplex::new(5.0, 5.0));
    }
}
