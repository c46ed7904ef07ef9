//! Profiling infrastructure for measuring simulation throughput.
//!
//! This module provides:
//! - Global counters for environment and game events
//! - Time accumulators for resets, steps and observation encoding
//! - RAII-style scoped timers for measuring durations
//! - A summary report on stderr
//!
//! All functionality is gated behind the `profiling` feature flag.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Global counters for profiling metrics.
pub struct Counters {
    // Event counters
    pub env_resets: AtomicU64,
    pub env_steps: AtomicU64,
    pub rounds_settled: AtomicU64,
    pub games_finished: AtomicU64,

    // Time accumulators (in nanoseconds)
    pub time_env_reset_ns: AtomicU64,
    pub time_env_step_ns: AtomicU64,
    pub time_feature_encode_ns: AtomicU64,
}

impl Counters {
    /// Create a new Counters instance with all values at zero.
    pub const fn new() -> Self {
        Self {
            env_resets: AtomicU64::new(0),
            env_steps: AtomicU64::new(0),
            rounds_settled: AtomicU64::new(0),
            games_finished: AtomicU64::new(0),

            time_env_reset_ns: AtomicU64::new(0),
            time_env_step_ns: AtomicU64::new(0),
            time_feature_encode_ns: AtomicU64::new(0),
        }
    }

    fn all(&self) -> [&AtomicU64; 7] {
        [
            &self.env_resets,
            &self.env_steps,
            &self.rounds_settled,
            &self.games_finished,
            &self.time_env_reset_ns,
            &self.time_env_step_ns,
            &self.time_feature_encode_ns,
        ]
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        for counter in self.all() {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}

/// Global profiling counters instance.
pub static PROF: Counters = Counters::new();

/// RAII-style scoped timer that accumulates elapsed time on drop.
///
/// # Example
///
/// ```ignore
/// use azul_rl_env::profiling::{Timer, PROF};
///
/// fn step() {
///     let _t = Timer::new(&PROF.time_env_step_ns);
///     // ... work happens here ...
/// } // timer adds elapsed time to PROF.time_env_step_ns on drop
/// ```
pub struct Timer {
    start: Instant,
    dest: &'static AtomicU64,
}

impl Timer {
    /// Create a new timer that will add elapsed time to `dest` on drop.
    #[inline]
    pub fn new(dest: &'static AtomicU64) -> Self {
        Self {
            start: Instant::now(),
            dest,
        }
    }
}

impl Drop for Timer {
    #[inline]
    fn drop(&mut self) {
        let elapsed_ns = self.start.elapsed().as_nanos() as u64;
        self.dest.fetch_add(elapsed_ns, Ordering::Relaxed);
    }
}

/// Print a human-readable summary of profiling counters and timings.
pub fn print_summary() {
    let resets = PROF.env_resets.load(Ordering::Relaxed);
    let steps = PROF.env_steps.load(Ordering::Relaxed);
    let rounds = PROF.rounds_settled.load(Ordering::Relaxed);
    let games = PROF.games_finished.load(Ordering::Relaxed);

    let time_reset_ns = PROF.time_env_reset_ns.load(Ordering::Relaxed);
    let time_step_ns = PROF.time_env_step_ns.load(Ordering::Relaxed);
    let time_encode_ns = PROF.time_feature_encode_ns.load(Ordering::Relaxed);

    // Convert ns to seconds
    let ns_to_sec = |ns: u64| ns as f64 / 1_000_000_000.0;

    eprintln!("\n=== Profiling Summary ===\n");

    eprintln!("Event Counts:");
    eprintln!("  Environment resets:  {:>12}", resets);
    eprintln!("  Environment steps:   {:>12}", steps);
    eprintln!("  Rounds settled:      {:>12}", rounds);
    eprintln!("  Games finished:      {:>12}", games);

    eprintln!("\nTime Breakdown:");
    eprintln!("  Env reset total:      {:>10.3} s", ns_to_sec(time_reset_ns));
    eprintln!("  Env step total:       {:>10.3} s", ns_to_sec(time_step_ns));
    eprintln!("  Feature encode total: {:>10.3} s", ns_to_sec(time_encode_ns));

    eprintln!("\nDerived Metrics:");

    if time_step_ns > 0 && steps > 0 {
        let steps_per_sec = steps as f64 / ns_to_sec(time_step_ns);
        eprintln!("  Steps/sec:            {:>10.0}", steps_per_sec);
    }

    if games > 0 {
        eprintln!("  Steps/game:           {:>10.2}", steps as f64 / games as f64);
        eprintln!("  Rounds/game:          {:>10.2}", rounds as f64 / games as f64);
    }

    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    static LOCAL: Counters = Counters::new();

    #[test]
    fn test_timer_accumulates_on_drop() {
        {
            let _t = Timer::new(&LOCAL.time_env_step_ns);
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        assert!(LOCAL.time_env_step_ns.load(Ordering::Relaxed) >= 1_000_000);

        LOCAL.env_steps.fetch_add(3, Ordering::Relaxed);
        LOCAL.reset();
        assert_eq!(LOCAL.env_steps.load(Ordering::Relaxed), 0);
        assert_eq!(LOCAL.time_env_step_ns.load(Ordering::Relaxed), 0);
    }
}
