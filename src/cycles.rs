/// Monotonic source of cycle counts used by every tick-bounded window.
///
/// Implementations must be cheap enough to poll inside a sub-microsecond
/// busy-wait and must never go backwards during a run.
pub trait CycleCounter {
    fn read(&self) -> u64;
}

impl<C: CycleCounter + ?Sized> CycleCounter for &C {
    #[inline(always)]
    fn read(&self) -> u64 {
        (**self).read()
    }
}

/// The CPU's own counter: `rdtsc` on x86_64, `cntvct_el0` on aarch64,
/// nanoseconds since first use elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardwareCounter;

impl CycleCounter for HardwareCounter {
    #[inline(always)]
    fn read(&self) -> u64 {
        read_counter()
    }
}

// ---------------------------------------------------------------------------
// Arch-specific counter and no-op
// ---------------------------------------------------------------------------

#[cfg(target_arch = "x86_64")]
#[inline(always)]
fn read_counter() -> u64 {
    let lo: u32;
    let hi: u32;
    // SAFETY: rdtsc only reads the time-stamp counter into edx:eax.
    unsafe {
        core::arch::asm!(
            "rdtsc",
            out("eax") lo,
            out("edx") hi,
            options(nostack, nomem, preserves_flags)
        );
    }
    ((hi as u64) << 32) | lo as u64
}

#[cfg(target_arch = "aarch64")]
#[inline(always)]
fn read_counter() -> u64 {
    let value: u64;
    // SAFETY: cntvct_el0 is readable from EL0 on every supported OS.
    unsafe {
        core::arch::asm!(
            "mrs {}, cntvct_el0",
            out(reg) value,
            options(nostack, nomem, preserves_flags)
        );
    }
    value
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline(always)]
fn read_counter() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

/// Single architectural no-op, kept opaque to the optimizer.
#[inline(always)]
pub fn nop() {
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    // SAFETY: `nop` has no inputs, outputs or side effects.
    unsafe {
        core::arch::asm!("nop", options(nomem, nostack, preserves_flags));
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    std::hint::black_box(());
}

// ---------------------------------------------------------------------------
// Cycle-bounded polling
// ---------------------------------------------------------------------------

/// Busy-waits until `tick` cycles have passed since `start`, returning how
/// many polling iterations fit in the window.
#[inline(always)]
pub fn count_since<C: CycleCounter + ?Sized>(counter: &C, start: u64, tick: u64) -> u64 {
    let mut ops: u64 = 0;
    while counter.read().wrapping_sub(start) < tick {
        ops += 1;
        nop();
    }
    ops
}

/// Busy-waits for `tick` cycles starting now, counting iterations.
#[inline(always)]
pub fn count_for<C: CycleCounter + ?Sized>(counter: &C, tick: u64) -> u64 {
    let start = counter.read();
    count_since(counter, start, tick)
}

/// Busy-waits for `tick` cycles starting now without counting.
#[inline(always)]
pub fn spin_for<C: CycleCounter + ?Sized>(counter: &C, tick: u64) {
    let start = counter.read();
    while counter.read().wrapping_sub(start) < tick {
        nop();
    }
}

/// Test double: advances by a fixed step on every read.
#[cfg(test)]
pub struct StepCounter {
    value: std::cell::Cell<u64>,
    step: u64,
}

#[cfg(test)]
impl StepCounter {
    pub fn new(start: u64, step: u64) -> Self {
        Self {
            value: std::cell::Cell::new(start),
            step,
        }
    }

    /// Simulates cycles consumed by work done between reads.
    pub fn advance(&self, cycles: u64) {
        self.value.set(self.value.get() + cycles);
    }

    pub fn current(&self) -> u64 {
        self.value.get()
    }
}

#[cfg(test)]
impl CycleCounter for StepCounter {
    fn read(&self) -> u64 {
        let v = self.value.get();
        self.value.set(v + self.step);
        v
    }
}
