//! Per-turn countdown.
//!
//! Each [`TurnTimer::start`] issues a new generation and asks the scheduler to
//! call back with it once the budget runs out. A callback only counts if its
//! generation is still the armed one, so a wakeup that was already in flight
//! when the turn ended is dropped on arrival.

use chrono::Utc;
use std::time::Duration;

use crate::models::TimerUpdate;

pub const DEFAULT_TURN_BUDGET: Duration = Duration::from_millis(60_000);

/// Delivers a deferred `TurnExpired(generation)` back to the table
pub trait TimerScheduler {
    /// Replaces any pending wakeup with one for `generation`, due after `after`
    fn schedule(&mut self, generation: u64, after: Duration);

    /// Drops the pending wakeup, if any
    fn cancel(&mut self);
}

#[derive(Debug)]
pub struct TurnTimer<S> {
    scheduler: S,
    budget: Duration,
    generation: u64,
    armed: Option<u64>,
    turn_started_at: Option<i64>,
}

impl<S: TimerScheduler> TurnTimer<S> {
    pub fn new(scheduler: S, budget: Duration) -> Self {
        TurnTimer {
            scheduler,
            budget,
            generation: 0,
            armed: None,
            turn_started_at: None,
        }
    }

    /// Arms the countdown for a new turn, superseding any earlier one
    pub fn start(&mut self) -> TimerUpdate {
        self.generation += 1;
        self.armed = Some(self.generation);
        let started_at = Utc::now().timestamp_millis();
        self.turn_started_at = Some(started_at);
        self.scheduler.schedule(self.generation, self.budget);

        TimerUpdate {
            budget_ms: self.budget_ms(),
            start_timestamp: started_at,
        }
    }

    pub fn stop(&mut self) {
        if self.armed.take().is_some() {
            self.scheduler.cancel();
        }
        self.turn_started_at = None;
    }

    /// Consumes a firing. Returns true only for the armed generation.
    pub fn expire(&mut self, generation: u64) -> bool {
        if self.armed != Some(generation) {
            return false;
        }
        self.armed = None;
        self.turn_started_at = None;
        true
    }

    /// The running countdown, for viewers that connect mid-turn
    pub fn status(&self) -> Option<TimerUpdate> {
        self.armed?;
        Some(TimerUpdate {
            budget_ms: self.budget_ms(),
            start_timestamp: self.turn_started_at?,
        })
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    fn budget_ms(&self) -> u64 {
        u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Scheduler that only records what it was asked to do
    #[derive(Debug, Default)]
    pub struct ManualScheduler {
        pub pending: Option<(u64, Duration)>,
        pub scheduled: Vec<u64>,
        pub cancellations: usize,
    }

    impl TimerScheduler for ManualScheduler {
        fn schedule(&mut self, generation: u64, after: Duration) {
            self.pending = Some((generation, after));
            self.scheduled.push(generation);
        }

        fn cancel(&mut self) {
            self.pending = None;
            self.cancellations += 1;
        }
    }
}
