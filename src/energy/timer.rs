//! Deferred flag resets
//!
//! A small timer queue driven by the simulation clock. Each entry remembers
//! which trigger generation scheduled it.

use serde::{Deserialize, Serialize};

/// Slack for accumulated frame deltas (60 x 1/60 is not exactly 1.0)
const DUE_EPSILON: f64 = 1e-9;

/// Which expiring timers are allowed to lower the generation flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlagResetPolicy {
    /// Only the timer of the latest trigger clears the flag
    #[default]
    Generational,
    /// Every timer clears the flag, even one left over from an older trigger
    EveryTimer,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScheduledReset {
    due: f64,
    generation: u64,
}

/// Pending resets on a monotonic clock
#[derive(Debug, Clone, Default)]
pub struct FlagResetSchedule {
    /// Simulation seconds elapsed
    clock: f64,
    pending: Vec<ScheduledReset>,
}

impl FlagResetSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time in seconds
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Queue a reset `delay` seconds from now on behalf of `generation`
    pub fn schedule(&mut self, delay: f64, generation: u64) {
        self.pending.push(ScheduledReset {
            due: self.clock + delay.max(0.0),
            generation,
        });
    }

    /// Advance the clock and return the generations whose timers fired, in due order
    pub fn advance(&mut self, delta: f64) -> Vec<u64> {
        self.clock += delta;

        let now = self.clock + DUE_EPSILON;
        let mut fired: Vec<ScheduledReset> = Vec::new();
        self.pending.retain(|reset| {
            if reset.due <= now {
                fired.push(*reset);
                false
            } else {
                true
            }
        });

        fired.sort_by(|a, b| a.due.total_cmp(&b.due));
        fired.into_iter().map(|r| r.generation).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_due() {
        let mut schedule = FlagResetSchedule::new();
        schedule.schedule(1.0, 1);

        assert!(schedule.advance(0.5).is_empty());
        assert_eq!(schedule.advance(0.5), vec![1]);
        assert_eq!(schedule.pending(), 0);
        assert!(schedule.advance(10.0).is_empty());
    }

    #[test]
    fn test_frame_deltas_reach_deadline() {
        let mut schedule = FlagResetSchedule::new();
        schedule.schedule(1.0, 7);

        let mut fired = Vec::new();
        for _ in 0..60 {
            fired.extend(schedule.advance(1.0 / 60.0));
        }
        assert_eq!(fired, vec![7]);
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut schedule = FlagResetSchedule::new();
        schedule.schedule(3.0, 1);
        schedule.schedule(1.0, 2);
        schedule.schedule(2.0, 3);

        assert_eq!(schedule.advance(5.0), vec![2, 3, 1]);
        assert!((schedule.clock() - 5.0).abs() < 1e-12);
    }
}
