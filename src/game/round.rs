//! Round state machine
//!
//! One play session in a single mode. The round is driven by discrete
//! events (start, digit, backspace, clear, submit, tick, end of reveal) and
//! never touches storage or the terminal. Events that do not fit the current
//! phase are ignored.
//!
//! ```text
//! Setup ──start──▶ InProgress ──wrong (practice)──▶ Reveal
//!                      ▲  │                           │
//!                      │  └──────end_reveal───────────┘
//!                      └─ ... ──▶ Over (target reached, no lives, time up)
//! ```

use super::buffer::AnswerBuffer;
use super::{generate_problem_with_rng, Problem};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Seconds on the clock at the start of a time attack round
pub const TIME_ATTACK_SECONDS: u32 = 60;

/// Lives at the start of a survival round
pub const INITIAL_LIVES: u32 = 3;

/// Practice question counts offered to the player
pub const PRACTICE_TARGETS: [u32; 3] = [10, 20, 30];

/// Practice target used when none was chosen yet
pub const DEFAULT_TARGET: u32 = 10;

/// How long a practice round shows the correct answer after a miss
pub const REVEAL_DELAY: Duration = Duration::from_millis(2000);

/// Play mode, fixed for the lifetime of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Untimed, ends after a chosen number of questions
    Practice,
    /// 60 second countdown
    TimeAttack,
    /// Three lives, a wrong answer costs one
    Survival,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Practice, Mode::TimeAttack, Mode::Survival];

    /// Modes that have a leaderboard
    pub const RANKED: [Mode; 2] = [Mode::TimeAttack, Mode::Survival];

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Practice => "Practice",
            Mode::TimeAttack => "Time Attack",
            Mode::Survival => "Survival",
        }
    }

    /// Stable key used in storage
    pub fn key(&self) -> &'static str {
        match self {
            Mode::Practice => "practice",
            Mode::TimeAttack => "time_attack",
            Mode::Survival => "survival",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Mode::ALL.into_iter().find(|m| m.key() == key)
    }

    /// Whether finished rounds produce a [`GameResult`]
    pub fn is_ranked(&self) -> bool {
        !matches!(self, Mode::Practice)
    }
}

/// Lifecycle phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the practice target to be chosen
    Setup,
    /// Accepting input
    InProgress,
    /// Practice only: showing the correct answer, input disabled
    Reveal,
    /// Terminal
    Over,
}

/// What a submit did, for feedback in the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to judge (empty input, wrong phase)
    Ignored,
    Correct { finished: bool },
    Wrong { answer: u32, finished: bool },
}

/// Outcome of a finished ranked round, handed to the leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub mode: Mode,
    pub score: u32,
    pub total_questions: u32,
    pub duration_seconds: u32,
}

impl GameResult {
    pub fn accuracy(&self) -> u32 {
        accuracy(self.score, self.total_questions)
    }
}

/// Read-only view of a round for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub mode: Mode,
    pub phase: Phase,
    pub generation: u64,
    pub score: u32,
    pub total_questions: u32,
    pub problem: Option<Problem>,
    pub input: String,
    pub target_questions: u32,
    pub time_left: u32,
    pub lives: u32,
    /// Correct answer while a practice reveal is showing
    pub revealed_answer: Option<u32>,
    pub accuracy: u32,
}

impl RoundSnapshot {
    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }
}

/// Percentage of correct answers, rounded; 0 before any answer.
pub fn accuracy(score: u32, total_questions: u32) -> u32 {
    if total_questions == 0 {
        return 0;
    }
    (score as f64 / total_questions as f64 * 100.0).round() as u32
}

/// A single play session
pub struct Round<R = StdRng> {
    rng: R,
    mode: Mode,
    phase: Phase,
    generation: u64,
    score: u32,
    total_questions: u32,
    problem: Option<Problem>,
    input: AnswerBuffer,
    target_questions: u32,
    time_left: u32,
    lives: u32,
    started_at: Option<Instant>,
    result: Option<GameResult>,
}

impl Default for Round<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl Round<StdRng> {
    /// Create a round in setup, seeded from the OS.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl<R: Rng> Round<R> {
    /// Create a round in setup drawing problems from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            mode: Mode::Practice,
            phase: Phase::Setup,
            generation: 0,
            score: 0,
            total_questions: 0,
            problem: None,
            input: AnswerBuffer::new(),
            target_questions: DEFAULT_TARGET,
            time_left: TIME_ATTACK_SECONDS,
            lives: INITIAL_LIVES,
            started_at: None,
            result: None,
        }
    }

    /// Start (or restart) a round, replacing all previous state.
    ///
    /// `target` only matters for practice; `None` keeps the previous target.
    /// `now` marks the start of the survival clock.
    pub fn start(&mut self, mode: Mode, target: Option<u32>, now: Instant) {
        self.generation += 1;
        self.mode = mode;
        self.phase = Phase::InProgress;
        self.score = 0;
        self.total_questions = 0;
        self.input.clear();
        if let Some(target) = target {
            self.target_questions = target.max(1);
        }
        self.time_left = TIME_ATTACK_SECONDS;
        self.lives = INITIAL_LIVES;
        self.started_at = Some(now);
        self.result = None;
        self.next_problem();

        tracing::info!(
            mode = mode.key(),
            generation = self.generation,
            target = self.target_questions,
            "round started"
        );
    }

    /// Type a digit into the answer.
    pub fn append_digit(&mut self, digit: char) {
        if self.accepts_input() {
            self.input.push(digit);
        }
    }

    pub fn backspace(&mut self) {
        if self.accepts_input() {
            self.input.pop();
        }
    }

    pub fn clear(&mut self) {
        if self.accepts_input() {
            self.input.clear();
        }
    }

    /// Judge the typed answer against the current problem, answered at `now`.
    pub fn submit(&mut self, now: Instant) -> SubmitOutcome {
        if !self.accepts_input() {
            return SubmitOutcome::Ignored;
        }
        let (Some(value), Some(problem)) = (self.input.value(), self.problem.as_ref()) else {
            return SubmitOutcome::Ignored;
        };
        let answer = problem.answer;

        self.total_questions += 1;

        if problem.check(value) {
            self.score += 1;
            if self.mode == Mode::Practice && self.total_questions >= self.target_questions {
                self.finish(0);
                return SubmitOutcome::Correct { finished: true };
            }
            self.next_problem();
            return SubmitOutcome::Correct { finished: false };
        }

        match self.mode {
            Mode::Practice => {
                // Typed answer stays visible next to the correct one
                self.phase = Phase::Reveal;
                tracing::debug!(generation = self.generation, answer, "revealing answer");
            }
            Mode::TimeAttack => self.next_problem(),
            Mode::Survival => {
                self.lives = self.lives.saturating_sub(1);
                if self.lives == 0 {
                    let elapsed = self
                        .started_at
                        .map(|t| now.saturating_duration_since(t).as_secs() as u32)
                        .unwrap_or(0);
                    self.finish(elapsed);
                    return SubmitOutcome::Wrong {
                        answer,
                        finished: true,
                    };
                }
                self.next_problem();
            }
        }
        SubmitOutcome::Wrong {
            answer,
            finished: false,
        }
    }

    /// End a practice reveal scheduled by round `generation`.
    ///
    /// Ignored when no reveal is showing or the round was restarted since.
    pub fn end_reveal(&mut self, generation: u64) {
        if self.phase != Phase::Reveal || generation != self.generation {
            return;
        }
        self.phase = Phase::InProgress;
        self.next_problem();
    }

    /// One second of time attack countdown.
    pub fn tick(&mut self) {
        if self.mode != Mode::TimeAttack || self.phase != Phase::InProgress {
            return;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.finish(TIME_ATTACK_SECONDS);
        }
    }

    /// Result of the round that just ended; yields it once.
    pub fn take_result(&mut self) -> Option<GameResult> {
        self.result.take()
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            mode: self.mode,
            phase: self.phase,
            generation: self.generation,
            score: self.score,
            total_questions: self.total_questions,
            problem: self.problem.clone(),
            input: self.input.as_str().to_string(),
            target_questions: self.target_questions,
            time_left: self.time_left,
            lives: self.lives,
            revealed_answer: match self.phase {
                Phase::Reveal => self.problem.as_ref().map(|p| p.answer),
                _ => None,
            },
            accuracy: accuracy(self.score, self.total_questions),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }

    pub fn is_revealing(&self) -> bool {
        self.phase == Phase::Reveal
    }

    fn accepts_input(&self) -> bool {
        self.phase == Phase::InProgress
    }

    fn next_problem(&mut self) {
        self.problem = Some(generate_problem_with_rng(&mut self.rng, None));
        self.input.clear();
    }

    /// End the round; ranked modes keep a result lasting `duration_seconds`.
    fn finish(&mut self, duration_seconds: u32) {
        self.phase = Phase::Over;

        if self.mode.is_ranked() {
            self.result = Some(GameResult {
                mode: self.mode,
                score: self.score,
                total_questions: self.total_questions,
                duration_seconds,
            });
        }

        tracing::info!(
            mode = self.mode.key(),
            generation = self.generation,
            score = self.score,
            total = self.total_questions,
            "round over"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round() -> Round {
        Round::with_rng(StdRng::seed_from_u64(1234))
    }

    fn type_number<R: Rng>(round: &mut Round<R>, n: u32) {
        for c in n.to_string().chars() {
            round.append_digit(c);
        }
    }

    fn current_answer<R: Rng>(round: &Round<R>) -> u32 {
        round.snapshot().problem.expect("problem").answer
    }

    fn answer_correctly<R: Rng>(round: &mut Round<R>) -> SubmitOutcome {
        let answer = current_answer(round);
        type_number(round, answer);
        round.submit(Instant::now())
    }

    fn answer_wrongly<R: Rng>(round: &mut Round<R>) -> SubmitOutcome {
        let wrong = current_answer(round) + 1;
        type_number(round, wrong);
        round.submit(Instant::now())
    }

    fn assert_score_bounded<R: Rng>(round: &Round<R>) {
        let s = round.snapshot();
        assert!(s.score <= s.total_questions);
    }

    #[test]
    fn test_new_round_is_in_setup() {
        let round = round();
        let s = round.snapshot();
        assert_eq!(s.phase, Phase::Setup);
        assert!(s.problem.is_none());
        assert_eq!(s.target_questions, DEFAULT_TARGET);
    }

    #[test]
    fn test_start_initializes_counters() {
        let mut round = round();
        round.start(Mode::TimeAttack, None, Instant::now());
        let s = round.snapshot();
        assert_eq!(s.phase, Phase::InProgress);
        assert_eq!(s.score, 0);
        assert_eq!(s.total_questions, 0);
        assert_eq!(s.time_left, TIME_ATTACK_SECONDS);
        assert_eq!(s.lives, INITIAL_LIVES);
        assert!(s.problem.is_some());
        assert!(s.input.is_empty());
    }

    #[test]
    fn test_input_ignored_in_setup() {
        let mut round = round();
        round.append_digit('5');
        assert!(round.snapshot().input.is_empty());
        assert_eq!(round.submit(Instant::now()), SubmitOutcome::Ignored);
    }

    #[test]
    fn test_practice_ends_at_target() {
        let mut round = round();
        round.start(Mode::Practice, Some(10), Instant::now());
        for i in 0..10 {
            let outcome = answer_correctly(&mut round);
            assert_eq!(outcome, SubmitOutcome::Correct { finished: i == 9 });
            assert_score_bounded(&round);
        }
        let s = round.snapshot();
        assert!(s.is_over());
        assert_eq!(s.score, 10);
        assert_eq!(s.total_questions, 10);
        assert_eq!(s.accuracy, 100);
    }

    #[test]
    fn test_practice_produces_no_result() {
        let mut round = round();
        round.start(Mode::Practice, Some(1), Instant::now());
        answer_correctly(&mut round);
        assert!(round.is_over());
        assert!(round.take_result().is_none());
    }

    #[test]
    fn test_practice_wrong_answer_reveals_then_continues() {
        let mut round = round();
        round.start(Mode::Practice, Some(10), Instant::now());
        let answer = current_answer(&round);

        let outcome = answer_wrongly(&mut round);
        assert_eq!(
            outcome,
            SubmitOutcome::Wrong {
                answer,
                finished: false
            }
        );

        let s = round.snapshot();
        assert_eq!(s.phase, Phase::Reveal);
        assert_eq!(s.revealed_answer, Some(answer));
        assert_eq!(s.total_questions, 1);
        assert_eq!(s.score, 0);
        assert!(!s.input.is_empty());

        round.end_reveal(round.generation());
        let s = round.snapshot();
        assert_eq!(s.phase, Phase::InProgress);
        assert!(!s.is_over());
        assert!(s.input.is_empty());
        assert_eq!(s.revealed_answer, None);
        assert_eq!(s.total_questions, 1);
    }

    #[test]
    fn test_reveal_disables_input() {
        let mut round = round();
        round.start(Mode::Practice, Some(10), Instant::now());
        answer_wrongly(&mut round);
        let typed = round.snapshot().input;

        round.append_digit('7');
        round.backspace();
        round.clear();
        assert_eq!(round.submit(Instant::now()), SubmitOutcome::Ignored);

        let s = round.snapshot();
        assert_eq!(s.input, typed);
        assert_eq!(s.total_questions, 1);
    }

    #[test]
    fn test_stale_reveal_is_ignored() {
        let mut round = round();
        round.start(Mode::Practice, Some(10), Instant::now());
        answer_wrongly(&mut round);
        let stale = round.generation();

        round.start(Mode::Practice, Some(10), Instant::now());
        answer_wrongly(&mut round);
        round.end_reveal(stale);
        assert!(round.is_revealing());

        round.end_reveal(round.generation());
        assert!(!round.is_revealing());
    }

    #[test]
    fn test_end_reveal_without_reveal_is_noop() {
        let mut round = round();
        round.start(Mode::Practice, Some(10), Instant::now());
        let problem = round.snapshot().problem;
        round.end_reveal(round.generation());
        assert_eq!(round.snapshot().problem, problem);
    }

    #[test]
    fn test_practice_never_ends_on_wrong_answer() {
        let mut round = round();
        round.start(Mode::Practice, Some(2), Instant::now());
        for _ in 0..5 {
            answer_wrongly(&mut round);
            round.end_reveal(round.generation());
        }
        assert!(!round.is_over());
        assert_eq!(round.snapshot().total_questions, 5);

        // already past the target: the next correct answer ends it
        answer_correctly(&mut round);
        assert!(round.is_over());
    }

    #[test]
    fn test_time_attack_runs_out() {
        let mut round = round();
        round.start(Mode::TimeAttack, None, Instant::now());
        for _ in 0..59 {
            round.tick();
        }
        assert!(!round.is_over());
        round.tick();
        let s = round.snapshot();
        assert!(s.is_over());
        assert_eq!(s.time_left, 0);

        round.tick();
        assert_eq!(round.snapshot().time_left, 0);
    }

    #[test]
    fn test_time_attack_wrong_answer_skips() {
        let mut round = round();
        round.start(Mode::TimeAttack, None, Instant::now());
        answer_wrongly(&mut round);
        let s = round.snapshot();
        assert_eq!(s.phase, Phase::InProgress);
        assert_eq!(s.total_questions, 1);
        assert_eq!(s.score, 0);
        assert!(s.input.is_empty());
    }

    #[test]
    fn test_time_attack_result() {
        let mut round = round();
        round.start(Mode::TimeAttack, None, Instant::now());
        answer_correctly(&mut round);
        answer_correctly(&mut round);
        answer_wrongly(&mut round);
        for _ in 0..TIME_ATTACK_SECONDS {
            round.tick();
        }
        let result = round.take_result().expect("result");
        assert_eq!(
            result,
            GameResult {
                mode: Mode::TimeAttack,
                score: 2,
                total_questions: 3,
                duration_seconds: TIME_ATTACK_SECONDS,
            }
        );
        assert_eq!(result.accuracy(), 67);
        assert!(round.take_result().is_none());
    }

    #[test]
    fn test_tick_ignored_outside_time_attack() {
        let mut round = round();
        round.start(Mode::Survival, None, Instant::now());
        round.tick();
        assert_eq!(round.snapshot().time_left, TIME_ATTACK_SECONDS);
    }

    #[test]
    fn test_typed_input_lost_when_time_runs_out() {
        let mut round = round();
        round.start(Mode::TimeAttack, None, Instant::now());
        for _ in 0..TIME_ATTACK_SECONDS {
            round.tick();
        }
        round.append_digit('1');
        assert_eq!(round.submit(Instant::now()), SubmitOutcome::Ignored);
        assert_eq!(round.snapshot().total_questions, 0);
    }

    #[test]
    fn test_survival_three_strikes() {
        let mut round = round();
        round.start(Mode::Survival, None, Instant::now());
        assert_eq!(round.snapshot().lives, 3);

        answer_wrongly(&mut round);
        answer_wrongly(&mut round);
        assert!(!round.is_over());
        let outcome = answer_wrongly(&mut round);
        assert!(matches!(outcome, SubmitOutcome::Wrong { finished: true, .. }));

        let s = round.snapshot();
        assert!(s.is_over());
        assert_eq!(s.lives, 0);
        assert_eq!(s.total_questions, 3);
        assert_eq!(s.score, 0);

        let result = round.take_result().expect("result");
        assert_eq!(result.mode, Mode::Survival);
        assert_eq!(result.total_questions, 3);
    }

    #[test]
    fn test_survival_correct_answers_keep_lives() {
        let mut round = round();
        round.start(Mode::Survival, None, Instant::now());
        for _ in 0..20 {
            answer_correctly(&mut round);
        }
        answer_wrongly(&mut round);
        let s = round.snapshot();
        assert_eq!(s.score, 20);
        assert_eq!(s.total_questions, 21);
        assert_eq!(s.lives, 2);
        assert!(!s.is_over());
    }

    #[test]
    fn test_events_after_over_are_ignored() {
        let mut round = round();
        round.start(Mode::Survival, None, Instant::now());
        for _ in 0..3 {
            answer_wrongly(&mut round);
        }
        let before = round.snapshot();
        round.append_digit('1');
        round.backspace();
        round.clear();
        round.tick();
        assert_eq!(round.submit(Instant::now()), SubmitOutcome::Ignored);
        assert_eq!(round.snapshot(), before);
    }

    #[test]
    fn test_empty_submit_ignored() {
        let mut round = round();
        round.start(Mode::Survival, None, Instant::now());
        assert_eq!(round.submit(Instant::now()), SubmitOutcome::Ignored);
        assert_eq!(round.snapshot().total_questions, 0);
    }

    #[test]
    fn test_buffer_rules_through_round() {
        let mut round = round();
        round.start(Mode::Practice, Some(10), Instant::now());

        round.append_digit('0');
        round.append_digit('0');
        assert_eq!(round.snapshot().input, "0");

        round.append_digit('5');
        assert_eq!(round.snapshot().input, "5");

        round.append_digit('5');
        round.append_digit('5');
        round.append_digit('5');
        assert_eq!(round.snapshot().input, "555");

        round.backspace();
        assert_eq!(round.snapshot().input, "55");
        round.clear();
        assert!(round.snapshot().input.is_empty());
        round.backspace();
        assert!(round.snapshot().input.is_empty());
    }

    #[test]
    fn test_restart_replaces_state() {
        let mut round = round();
        round.start(Mode::Survival, None, Instant::now());
        answer_correctly(&mut round);
        answer_wrongly(&mut round);
        round.append_digit('4');
        let generation = round.generation();

        round.start(Mode::TimeAttack, None, Instant::now());
        let s = round.snapshot();
        assert_eq!(s.mode, Mode::TimeAttack);
        assert_eq!(s.score, 0);
        assert_eq!(s.total_questions, 0);
        assert_eq!(s.lives, INITIAL_LIVES);
        assert!(s.input.is_empty());
        assert!(s.generation > generation);
    }

    #[test]
    fn test_restart_keeps_previous_target() {
        let mut round = round();
        round.start(Mode::Practice, Some(20), Instant::now());
        round.start(Mode::Practice, None, Instant::now());
        assert_eq!(round.snapshot().target_questions, 20);
    }

    #[test]
    fn test_zero_target_is_raised_to_one() {
        let mut round = round();
        round.start(Mode::Practice, Some(0), Instant::now());
        assert_eq!(round.snapshot().target_questions, 1);
    }

    #[test]
    fn test_survival_duration_from_start() {
        let t0 = Instant::now();
        let mut round = round();
        round.start(Mode::Survival, None, t0);
        for s in [10, 20, 45] {
            let wrong = current_answer(&round) + 1;
            type_number(&mut round, wrong);
            round.submit(t0 + Duration::from_secs(s));
        }
        assert!(round.is_over());
        let result = round.take_result().expect("result");
        assert_eq!(result.duration_seconds, 45);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(0, 0), 0);
        assert_eq!(accuracy(1, 3), 33);
        assert_eq!(accuracy(2, 3), 67);
        assert_eq!(accuracy(1, 2), 50);
        assert_eq!(accuracy(5, 5), 100);
    }

    #[test]
    fn test_mode_keys() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_key(mode.key()), Some(mode));
        }
        assert_eq!(Mode::from_key("time-attack"), None);
        assert!(!Mode::Practice.is_ranked());
        assert!(Mode::TimeAttack.is_ranked());
        assert!(Mode::Survival.is_ranked());
    }
}
