//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Monotonic host time
//! - Polled periodic wake-ups for hosts without timer callbacks

/// Monotonic seconds since creation
#[derive(Debug, Clone)]
pub struct HostClock {
    #[cfg(not(target_arch = "wasm32"))]
    origin: std::time::Instant,
    #[cfg(target_arch = "wasm32")]
    origin_ms: f64,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        Self {
            origin_ms: performance_now_ms(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    #[cfg(target_arch = "wasm32")]
    pub fn now(&self) -> f64 {
        (performance_now_ms() - self.origin_ms) / 1000.0
    }
}

#[cfg(target_arch = "wasm32")]
fn performance_now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Periodic timer for hosts that poll instead of registering callbacks.
///
/// Fires at most once per poll however late the poll is, and re-arms from
/// the time it actually fired, like a chained `setTimeout`.
#[derive(Debug, Clone)]
pub struct WakeTimer {
    period: f64,
    next_due: Option<f64>,
}

impl WakeTimer {
    /// `period_ms` must be positive
    pub fn new(period_ms: f64) -> Self {
        Self {
            period: period_ms / 1000.0,
            next_due: None,
        }
    }

    /// Arm so the first wake-up fires at `now`
    pub fn arm(&mut self, now: f64) {
        self.next_due = Some(now);
    }

    /// Cancel the pending wake-up
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// True if a wake-up is due at `now`
    pub fn poll(&mut self, now: f64) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wake_timer_period() {
        let mut timer = WakeTimer::new(25.0);
        assert!(!timer.poll(0.0));

        timer.arm(0.0);
        assert!(timer.poll(0.0));
        assert!(!timer.poll(0.01));
        assert!(timer.poll(0.025));
    }

    #[test]
    fn test_late_poll_fires_once() {
        let mut timer = WakeTimer::new(25.0);
        timer.arm(0.0);
        assert!(timer.poll(0.0));
        // 200ms stall: one wake-up, re-armed from the stall
        assert!(timer.poll(0.2));
        assert!(!timer.poll(0.21));
        assert!(timer.poll(0.23));
    }

    #[test]
    fn test_cancel() {
        let mut timer = WakeTimer::new(25.0);
        timer.arm(0.0);
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.poll(10.0));
    }

    #[test]
    fn test_host_clock_is_monotonic() {
        let clock = HostClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(a >= 0.0);
    }
}
