//! Stopping policy for iterative propagation.
//!
//! The scheme consumes one epsilon per iteration and decides whether the run
//! goes on. Criteria, in the order they are checked:
//!
//! 1. elapsed time reached `max_time` → [`SchemeState::TimeLimit`]
//! 2. on check iterations (after `burn_in`, every `period_size`):
//!    epsilon ≤ threshold → [`SchemeState::Epsilon`], then relative change
//!    of epsilon since the previous check below `min_epsilon_rate`
//!    → [`SchemeState::Rate`]
//! 3. iteration count reached `max_iterations` → [`SchemeState::Limit`]
//!
//! Any criterion set to `None` is disabled.

use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

use credal_config::ApproximationSettings;

/// Where the scheme stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeState {
    /// Not started.
    Undefined,
    Continue,
    /// Epsilon fell to the threshold.
    Epsilon,
    /// Epsilon stopped changing fast enough.
    Rate,
    /// Iteration budget used up.
    Limit,
    /// Time budget used up.
    TimeLimit,
    /// Stopped by the caller.
    Stopped,
}

impl SchemeState {
    /// Terminal states that count as convergence.
    pub fn is_converged(self) -> bool {
        matches!(self, SchemeState::Epsilon | SchemeState::Rate)
    }

    pub fn is_running(self) -> bool {
        self == SchemeState::Continue
    }
}

impl fmt::Display for SchemeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchemeState::Undefined => "undefined",
            SchemeState::Continue => "continue",
            SchemeState::Epsilon => "stopped on epsilon",
            SchemeState::Rate => "stopped on epsilon rate",
            SchemeState::Limit => "stopped on max iterations",
            SchemeState::TimeLimit => "stopped on max time",
            SchemeState::Stopped => "stopped on request",
        })
    }
}

/// Epsilon/rate/iteration/time stopping policy.
#[derive(Debug, Clone)]
pub struct ApproximationScheme {
    settings: ApproximationSettings,
    state: SchemeState,
    iterations: u64,
    current_epsilon: Option<f64>,
    last_checked: Option<f64>,
    current_rate: Option<f64>,
    history: Vec<f64>,
    started: Option<Instant>,
    finished: Option<Duration>,
}

impl Default for ApproximationScheme {
    fn default() -> Self {
        Self::new(ApproximationSettings::default())
    }
}

impl ApproximationScheme {
    pub fn new(settings: ApproximationSettings) -> Self {
        Self {
            settings,
            state: SchemeState::Undefined,
            iterations: 0,
            current_epsilon: None,
            last_checked: None,
            current_rate: None,
            history: Vec::new(),
            started: None,
            finished: None,
        }
    }

    pub fn settings(&self) -> &ApproximationSettings {
        &self.settings
    }

    pub fn set_epsilon(&mut self, epsilon: Option<f64>) {
        self.settings.epsilon = epsilon;
    }

    pub fn set_min_epsilon_rate(&mut self, rate: Option<f64>) {
        self.settings.min_epsilon_rate = rate;
    }

    pub fn set_max_iterations(&mut self, max: Option<u64>) {
        self.settings.max_iterations = max;
    }

    pub fn set_max_time(&mut self, max: Option<Duration>) {
        self.settings.max_time_secs = max.map(|d| d.as_secs_f64());
    }

    /// Check criteria every `period` iterations (at least 1).
    pub fn set_period_size(&mut self, period: u64) {
        self.settings.period_size = period.max(1);
    }

    pub fn set_burn_in(&mut self, burn_in: u64) {
        self.settings.burn_in = burn_in;
    }

    pub fn set_record_history(&mut self, record: bool) {
        self.settings.record_history = record;
    }

    /// Reset counters and start the clock.
    pub fn start(&mut self) {
        self.state = SchemeState::Continue;
        self.iterations = 0;
        self.current_epsilon = None;
        self.last_checked = None;
        self.current_rate = None;
        self.history.clear();
        self.started = Some(Instant::now());
        self.finished = None;
    }

    /// Feed the epsilon of one completed iteration.
    pub fn update(&mut self, epsilon: f64) -> SchemeState {
        match self.state {
            SchemeState::Undefined => self.start(),
            SchemeState::Continue => {}
            done => return done,
        }

        self.iterations += 1;
        self.current_epsilon = Some(epsilon);
        if self.settings.record_history {
            self.history.push(epsilon);
        }

        if let Some(max) = self.settings.max_time() {
            if self.elapsed() >= max {
                return self.finish(SchemeState::TimeLimit);
            }
        }

        let period = self.settings.period_size.max(1);
        let checking = self.iterations > self.settings.burn_in
            && (self.iterations - self.settings.burn_in) % period == 0;
        if checking {
            if let Some(threshold) = self.settings.epsilon {
                if epsilon <= threshold {
                    return self.finish(SchemeState::Epsilon);
                }
            }
            if let Some(min_rate) = self.settings.min_epsilon_rate {
                if let Some(prev) = self.last_checked.filter(|p| *p > 0.0) {
                    let rate = (epsilon - prev).abs() / prev;
                    self.current_rate = Some(rate);
                    if rate < min_rate {
                        self.last_checked = Some(epsilon);
                        return self.finish(SchemeState::Rate);
                    }
                }
            }
            self.last_checked = Some(epsilon);
        }

        if let Some(max) = self.settings.max_iterations {
            if self.iterations >= max {
                return self.finish(SchemeState::Limit);
            }
        }

        SchemeState::Continue
    }

    /// Stop at the next [`update`](Self::update).
    pub fn stop(&mut self) {
        if matches!(self.state, SchemeState::Undefined | SchemeState::Continue) {
            self.finish(SchemeState::Stopped);
        }
    }

    pub fn state(&self) -> SchemeState {
        self.state
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn current_epsilon(&self) -> Option<f64> {
        self.current_epsilon
    }

    /// Relative epsilon change measured at the last check.
    pub fn current_rate(&self) -> Option<f64> {
        self.current_rate
    }

    /// Time since [`start`](Self::start), frozen once the scheme stops.
    pub fn elapsed(&self) -> Duration {
        match (self.finished, self.started) {
            (Some(done), _) => done,
            (None, Some(start)) => start.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }

    /// Epsilon per iteration, when history recording is on.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    fn finish(&mut self, state: SchemeState) -> SchemeState {
        self.finished = Some(self.started.map(|s| s.elapsed()).unwrap_or_default());
        self.state = state;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ApproximationSettings {
        ApproximationSettings {
            epsilon: None,
            min_epsilon_rate: None,
            max_iterations: None,
            max_time_secs: None,
            period_size: 1,
            burn_in: 0,
            record_history: false,
        }
    }

    #[test]
    fn test_stops_on_epsilon() {
        let mut scheme = ApproximationScheme::new(ApproximationSettings {
            epsilon: Some(0.01),
            ..settings()
        });
        scheme.start();
        assert_eq!(scheme.update(0.5), SchemeState::Continue);
        assert_eq!(scheme.update(0.01), SchemeState::Epsilon);
        assert_eq!(scheme.iterations(), 2);
        assert!(scheme.state().is_converged());
        // Further updates do not count.
        assert_eq!(scheme.update(0.0), SchemeState::Epsilon);
        assert_eq!(scheme.iterations(), 2);
    }

    #[test]
    fn test_stops_on_rate() {
        let mut scheme = ApproximationScheme::new(ApproximationSettings {
            min_epsilon_rate: Some(0.1),
            ..settings()
        });
        scheme.start();
        assert_eq!(scheme.update(0.5), SchemeState::Continue);
        assert_eq!(scheme.update(0.25), SchemeState::Continue);
        assert_eq!(scheme.update(0.24), SchemeState::Rate);
        let rate = scheme.current_rate().unwrap();
        assert!((rate - 0.04).abs() < 1e-9);
    }

    #[test]
    fn test_stops_on_iteration_limit() {
        let mut scheme = ApproximationScheme::new(ApproximationSettings {
            max_iterations: Some(3),
            record_history: true,
            ..settings()
        });
        scheme.start();
        assert_eq!(scheme.update(0.3), SchemeState::Continue);
        assert_eq!(scheme.update(0.2), SchemeState::Continue);
        assert_eq!(scheme.update(0.1), SchemeState::Limit);
        assert_eq!(scheme.history(), &[0.3, 0.2, 0.1]);
        assert!(!scheme.state().is_converged());
    }

    #[test]
    fn test_stops_on_time_limit() {
        let mut scheme = ApproximationScheme::new(settings());
        scheme.set_max_time(Some(Duration::ZERO));
        scheme.start();
        assert_eq!(scheme.update(1.0), SchemeState::TimeLimit);
    }

    #[test]
    fn test_burn_in_and_period() {
        let mut scheme = ApproximationScheme::new(ApproximationSettings {
            epsilon: Some(1.0),
            burn_in: 2,
            period_size: 3,
            ..settings()
        });
        scheme.start();
        // Iterations 1..=4 are either burn-in or off-period.
        for _ in 0..4 {
            assert_eq!(scheme.update(0.0), SchemeState::Continue);
        }
        assert_eq!(scheme.update(0.0), SchemeState::Epsilon);
        assert_eq!(scheme.iterations(), 5);
    }

    #[test]
    fn test_stop_request() {
        let mut scheme = ApproximationScheme::new(settings());
        scheme.start();
        scheme.stop();
        assert_eq!(scheme.update(0.5), SchemeState::Stopped);
        assert_eq!(scheme.iterations(), 0);
    }

    #[test]
    fn test_update_before_start_starts() {
        let mut scheme = ApproximationScheme::new(ApproximationSettings {
            max_iterations: Some(1),
            ..settings()
        });
        assert_eq!(scheme.state(), SchemeState::Undefined);
        assert_eq!(scheme.update(0.5), SchemeState::Limit);
        assert!(scheme.elapsed() < Duration::from_secs(60));
    }
}
