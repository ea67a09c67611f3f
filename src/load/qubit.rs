//! Toy single-qubit state simulation used purely as CPU load.
//!
//! Gates are pure functions from state to state. The amplitude pair is never
//! renormalized, so rounding drift across the sequence is carried as-is.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use rand_core::RngCore;

use crate::cycles::nop;

const WALK_STEPS: usize = 150;
const SEARCH_STEPS: usize = 75;
const TRANSFORM_STEPS: usize = 150;

/// Complex amplitude of a basis state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Amplitude {
    pub real: f64,
    pub imag: f64,
}

impl Amplitude {
    pub const fn new(real: f64, imag: f64) -> Self {
        Self { real, imag }
    }

    pub fn squared_modulus(self) -> f64 {
        self.real * self.real + self.imag * self.imag
    }
}

/// `alpha|0> + beta|1>`, nominally with `|alpha|^2 + |beta|^2 = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Qubit {
    pub alpha: Amplitude,
    pub beta: Amplitude,
}

impl Default for Qubit {
    fn default() -> Self {
        Self::zero()
    }
}

impl Qubit {
    pub const fn zero() -> Self {
        Self {
            alpha: Amplitude::new(1.0, 0.0),
            beta: Amplitude::new(0.0, 0.0),
        }
    }

    /// Returns 0 when `draw < |alpha|^2`, else 1. `draw` is in [0, 1).
    pub fn collapse(self, draw: f64) -> u8 {
        if draw < self.alpha.squared_modulus() {
            0
        } else {
            1
        }
    }

    pub fn measure<R: RngCore + ?Sized>(self, rng: &mut R) -> u8 {
        self.collapse(unit_draw(rng))
    }
}

/// Uniform value in [0, 1) from the top 53 bits of a 64-bit draw.
pub fn unit_draw<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

// ---------------------------------------------------------------------------
// Gates
// ---------------------------------------------------------------------------

#[inline(always)]
pub fn hadamard(q: Qubit) -> Qubit {
    let (a, b) = (q.alpha, q.beta);
    Qubit {
        alpha: Amplitude::new((a.real + b.real) * FRAC_1_SQRT_2, (a.imag + b.imag) * FRAC_1_SQRT_2),
        beta: Amplitude::new((a.real - b.real) * FRAC_1_SQRT_2, (a.imag - b.imag) * FRAC_1_SQRT_2),
    }
}

#[inline(always)]
pub fn pauli_x(q: Qubit) -> Qubit {
    Qubit {
        alpha: q.beta,
        beta: q.alpha,
    }
}

#[inline(always)]
pub fn pauli_z(q: Qubit) -> Qubit {
    Qubit {
        alpha: q.alpha,
        beta: Amplitude::new(-q.beta.real, -q.beta.imag),
    }
}

/// Multiplies beta by `i`.
#[inline(always)]
pub fn phase_s(q: Qubit) -> Qubit {
    Qubit {
        alpha: q.alpha,
        beta: Amplitude::new(-q.beta.imag, q.beta.real),
    }
}

/// Rotates beta by 45 degrees.
#[inline(always)]
pub fn phase_t(q: Qubit) -> Qubit {
    let b = q.beta;
    let (c, s) = (FRAC_1_SQRT_2, FRAC_1_SQRT_2);
    Qubit {
        alpha: q.alpha,
        beta: Amplitude::new(b.real * c - b.imag * s, b.real * s + b.imag * c),
    }
}

#[inline(always)]
pub fn rotate_y(q: Qubit, theta: f64) -> Qubit {
    let c = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    let (a, b) = (q.alpha, q.beta);
    Qubit {
        alpha: Amplitude::new(c * a.real - s * b.real, c * a.imag - s * b.imag),
        beta: Amplitude::new(s * a.real + c * b.real, s * a.imag + c * b.imag),
    }
}

/// Angle used at step `i` of the transform phase: `pi / 2^(1 + i mod 8)`.
pub fn transform_angle(i: usize) -> f64 {
    PI / (1u32 << (i % 8 + 1)) as f64
}

/// Fixed gate sequence: H, 150 x {X, H}, 75 x {Z, H, X, Z, X, H},
/// 150 x {RY(angle_i), S, T}.
pub fn gate_sequence(start: Qubit) -> Qubit {
    let mut q = hadamard(start);

    for _ in 0..WALK_STEPS {
        q = hadamard(pauli_x(q));
        nop();
    }

    for _ in 0..SEARCH_STEPS {
        q = pauli_z(q);
        q = hadamard(q);
        q = pauli_x(q);
        q = pauli_z(q);
        q = pauli_x(q);
        q = hadamard(q);
        nop();
    }

    for i in 0..TRANSFORM_STEPS {
        q = phase_t(phase_s(rotate_y(q, transform_angle(i))));
        nop();
    }

    q
}

/// Runs the gate sequence from |0> and measures once; the outcome is discarded.
#[inline]
pub fn run_quantum_load<R: RngCore + ?Sized>(rng: &mut R) {
    let q = gate_sequence(Qubit::zero());
    std::hint::black_box(q.measure(rng));
}
