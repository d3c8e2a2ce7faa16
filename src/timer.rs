//! Host-clock timers.
//!
//! Both timers are plain data polled from the frame loop with the current
//! session time, so they can be cancelled deterministically and never fire
//! into a finished game.

use std::time::Duration;

/// Minimum gap between repeated actions.
#[derive(Clone, Debug, PartialEq)]
pub struct Cooldown {
    period: Duration,
    ready_at: Option<Duration>,
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ready_at: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Claim the action at `now`.  Returns false, and changes nothing, while
    /// the previous claim is still cooling down.
    pub fn try_trigger(&mut self, now: Duration) -> bool {
        if self.is_cooling(now) {
            return false;
        }
        if !self.period.is_zero() {
            self.ready_at = Some(now + self.period);
        }
        true
    }

    pub fn is_cooling(&self, now: Duration) -> bool {
        self.ready_at.map(|ready| now < ready).unwrap_or(false)
    }

    /// Drop any pending cooldown.
    pub fn cancel(&mut self) {
        self.ready_at = None;
    }

    pub fn is_pending(&self) -> bool {
        self.ready_at.is_some()
    }
}

/// Fixed-period repeating timer.
#[derive(Clone, Debug, PartialEq)]
pub struct Interval {
    period: Duration,
    next_at: Option<Duration>,
}

impl Interval {
    /// A stopped interval; call `start` to arm it.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_at: None,
        }
    }

    pub fn start(&mut self, now: Duration) {
        self.next_at = Some(now + self.period);
    }

    /// Returns true at most once per call when a period boundary has passed.
    /// Missed periods collapse into one firing.
    pub fn poll(&mut self, now: Duration) -> bool {
        let Some(next) = self.next_at else {
            return false;
        };
        if now < next {
            return false;
        }
        let mut following = next + self.period;
        if following <= now {
            following = now + self.period;
        }
        self.next_at = Some(following);
        true
    }

    pub fn cancel(&mut self) {
        self.next_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn cooldown_blocks_until_period_elapses() {
        let mut c = Cooldown::from_millis(300);
        assert!(c.try_trigger(ms(0)));
        assert!(!c.try_trigger(ms(299)));
        assert!(c.try_trigger(ms(300)));
    }

    #[test]
    fn zero_cooldown_never_blocks() {
        let mut c = Cooldown::from_millis(0);
        assert!(c.try_trigger(ms(5)));
        assert!(c.try_trigger(ms(5)));
        assert!(!c.is_pending());
    }

    #[test]
    fn cancelled_cooldown_is_not_pending() {
        let mut c = Cooldown::from_millis(300);
        c.try_trigger(ms(0));
        assert!(c.is_pending());
        c.cancel();
        assert!(!c.is_pending());
    }

    #[test]
    fn interval_fires_once_per_period() {
        let mut i = Interval::new(ms(2000));
        i.start(ms(0));
        assert!(!i.poll(ms(1999)));
        assert!(i.poll(ms(2000)));
        assert!(!i.poll(ms(2001)));
        assert!(i.poll(ms(4000)));
    }

    #[test]
    fn interval_collapses_missed_periods() {
        let mut i = Interval::new(ms(100));
        i.start(ms(0));
        assert!(i.poll(ms(1000)));
        assert!(!i.poll(ms(1050)));
        assert!(i.poll(ms(1100)));
    }

    #[test]
    fn stopped_interval_never_fires() {
        let mut i = Interval::new(ms(100));
        assert!(!i.poll(ms(500)));
        i.start(ms(0));
        i.cancel();
        assert!(!i.poll(ms(500)));
        assert!(!i.is_armed());
    }
}
