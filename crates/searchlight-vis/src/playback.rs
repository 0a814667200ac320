//! Playback over a prepared run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use searchlight_steps::Step;

use crate::simulation::{Outcome, Run};

/// Auto-play pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Delay between automatic advances
    pub interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(900),
        }
    }
}

impl PlaybackConfig {
    /// Slower pacing for single-array walkthroughs.
    pub fn relaxed() -> Self {
        Self {
            interval: Duration::from_millis(1200),
        }
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }
}

/// Where playback stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing applied yet
    Idle,
    /// Some steps applied, more remain
    Stepping,
    /// Every step applied
    Exhausted,
}

/// Result of one advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance<'a> {
    /// The next step to render
    Step(&'a Step),
    /// Nothing left; the run's outcome
    Finished(&'a Outcome),
}

/// Cursor over a run's steps.
///
/// `position` counts applied steps, so it runs from 0 (idle) to the step
/// count (exhausted).
#[derive(Debug, Clone)]
pub struct Playback {
    run: Run,
    position: usize,
}

impl Playback {
    /// Start an idle playback over `run`.
    pub fn new(run: Run) -> Self {
        Self { run, position: 0 }
    }

    /// Get the recorded run.
    pub fn run(&self) -> &Run {
        &self.run
    }

    /// Number of steps applied so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the total number of steps.
    pub fn total(&self) -> usize {
        self.run.len()
    }

    /// Get the playback state, derived from the position.
    pub fn state(&self) -> PlaybackState {
        if self.position >= self.run.len() {
            PlaybackState::Exhausted
        } else if self.position == 0 {
            PlaybackState::Idle
        } else {
            PlaybackState::Stepping
        }
    }

    /// Check if every step has been applied.
    pub fn is_exhausted(&self) -> bool {
        self.state() == PlaybackState::Exhausted
    }

    /// Apply the next step, or report the outcome once every step is applied.
    /// Advancing an exhausted playback changes nothing.
    pub fn advance(&mut self) -> Advance<'_> {
        match self.run.steps().get(self.position) {
            Some(step) => {
                self.position += 1;
                Advance::Step(step)
            }
            None => Advance::Finished(self.run.outcome()),
        }
    }

    /// Back to idle.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// The most recently applied step.
    pub fn current(&self) -> Option<&Step> {
        self.position.checked_sub(1).and_then(|i| self.run.steps().get(i))
    }

    /// Progress as a fraction (0.0 - 1.0).
    pub fn progress(&self) -> f64 {
        if self.run.is_empty() {
            0.0
        } else {
            self.position as f64 / self.run.len() as f64
        }
    }
}

/// Playback status for sending to the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub position: usize,
    pub total: usize,
    pub state: PlaybackState,
    pub progress: f64,
}

impl From<&Playback> for PlaybackStatus {
    fn from(playback: &Playback) -> Self {
        Self {
            position: playback.position,
            total: playback.total(),
            state: playback.state(),
            progress: playback.progress(),
        }
    }
}
