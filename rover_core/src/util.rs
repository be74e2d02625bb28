//! Period helpers for the control loop and the hazard sampler.

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Loop period in microseconds for a rate in Hz (`hz` is clamped to >= 1).
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Loop period as a `Duration`.
#[inline]
pub fn period(hz: u32) -> std::time::Duration {
    std::time::Duration::from_micros(period_us(hz))
}
