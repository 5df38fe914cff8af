//! Game session state
//!
//! Wraps a [`Round`] with the wall-clock side of play: the once-per-second
//! time attack tick, the practice reveal delay and the feedback line shown
//! under the problem.

use crate::game::round::{GameResult, Mode, Round, RoundSnapshot, SubmitOutcome, REVEAL_DELAY};
use crate::game::schedule::{Scheduler, Task};
use std::time::{Duration, Instant};

/// Interval between time attack ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// One active game session
pub struct GameSession {
    round: Round,
    scheduler: Scheduler,
    reveal_delay: Duration,
    /// Feedback message from the last submission
    pub feedback: String,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(REVEAL_DELAY)
    }
}

impl GameSession {
    /// Create a session waiting for its first round
    pub fn new(reveal_delay: Duration) -> Self {
        Self::with_round(Round::new(), reveal_delay)
    }

    /// Create a session around a prepared round (for seeded tests)
    pub fn with_round(round: Round, reveal_delay: Duration) -> Self {
        Self {
            round,
            scheduler: Scheduler::new(),
            reveal_delay,
            feedback: String::new(),
        }
    }

    /// Start a new round, dropping anything scheduled by the previous one
    pub fn start(&mut self, mode: Mode, target: Option<u32>, now: Instant) {
        self.scheduler.cancel_all();
        self.round.start(mode, target, now);
        self.feedback.clear();
        if mode == Mode::TimeAttack {
            self.scheduler
                .schedule(Task::Tick, now, TICK_INTERVAL, self.round.generation());
        }
    }

    /// Replay the current mode (and practice target)
    pub fn restart(&mut self, now: Instant) {
        let mode = self.round.mode();
        self.start(mode, None, now);
    }

    /// Stop all timers, e.g. when the player leaves the game screen
    pub fn leave(&mut self) {
        self.scheduler.cancel_all();
    }

    /// Handle a digit key (locked while revealing or when over)
    pub fn on_digit(&mut self, digit: char) {
        if self.round.is_revealing() || self.round.is_over() {
            return;
        }
        self.round.append_digit(digit);
        self.feedback.clear();
    }

    /// Handle backspace (locked while revealing or when over)
    pub fn on_backspace(&mut self) {
        if self.round.is_revealing() || self.round.is_over() {
            return;
        }
        self.round.backspace();
        self.feedback.clear();
    }

    /// Handle the clear key
    pub fn on_clear(&mut self) {
        if self.round.is_revealing() || self.round.is_over() {
            return;
        }
        self.round.clear();
        self.feedback.clear();
    }

    /// Handle answer submission (Enter key)
    pub fn on_submit(&mut self, now: Instant) {
        let outcome = self.round.submit(now);
        let snapshot = self.round.snapshot();

        match outcome {
            SubmitOutcome::Ignored => return,
            SubmitOutcome::Correct { finished: true } => {
                self.feedback = "DONE! Great job!".to_string();
            }
            SubmitOutcome::Correct { finished: false } => {
                self.feedback = "OK! Correct".to_string();
            }
            SubmitOutcome::Wrong { finished: true, .. } => {
                self.feedback = "GAME OVER".to_string();
            }
            SubmitOutcome::Wrong { answer, .. } => match snapshot.mode {
                Mode::Practice => {
                    self.feedback = format!("WRONG! The answer is {}", answer);
                    self.scheduler.schedule(
                        Task::EndReveal,
                        now,
                        self.reveal_delay,
                        snapshot.generation,
                    );
                }
                Mode::TimeAttack => {
                    self.feedback = "MISS".to_string();
                }
                Mode::Survival => {
                    self.feedback = format!("WRONG! Lives left: {}", snapshot.lives);
                }
            },
        }

        if snapshot.is_over() {
            self.scheduler.cancel_all();
        }
    }

    /// Fire every task due at `now`. Tasks from an earlier round are dropped.
    pub fn poll_timers(&mut self, now: Instant) {
        for scheduled in self.scheduler.take_due(now) {
            if scheduled.generation != self.round.generation() {
                tracing::debug!(
                    task = ?scheduled.task,
                    generation = scheduled.generation,
                    current = self.round.generation(),
                    "dropping stale task"
                );
                continue;
            }

            match scheduled.task {
                Task::Tick => {
                    self.round.tick();
                    if self.round.is_over() {
                        self.feedback = "TIME'S UP!".to_string();
                        self.scheduler.cancel_all();
                    } else {
                        // Re-arm from the deadline, not from `now`, so the clock doesn't drift
                        self.scheduler.schedule(
                            Task::Tick,
                            scheduled.due,
                            TICK_INTERVAL,
                            scheduled.generation,
                        );
                    }
                }
                Task::EndReveal => {
                    self.round.end_reveal(scheduled.generation);
                    self.feedback.clear();
                }
            }
        }
    }

    /// When the next timer needs attention
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        self.round.snapshot()
    }

    pub fn is_over(&self) -> bool {
        self.round.is_over()
    }

    /// Result of a finished ranked round, yielded once
    pub fn take_result(&mut self) -> Option<GameResult> {
        self.round.take_result()
    }
}
