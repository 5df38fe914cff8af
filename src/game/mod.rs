//! Game logic: arithmetic problems, answer input, rounds and their timers

pub mod buffer;
pub mod round;
pub mod schedule;

use rand::prelude::*;
use std::collections::HashSet;
use std::fmt;

/// Largest sum, minuend and dividend a problem may show.
pub const MAX_VALUE: u32 = 100;
/// Largest factor, quotient and divisor.
pub const MAX_FACTOR: u32 = 10;

/// Arithmetic operator of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// All operators, in the order they are offered.
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    /// Symbol used in the rendered question.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single arithmetic question with its correct answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub operand_a: u32,
    pub operand_b: u32,
    pub operator: Operator,
    pub answer: u32,
    /// Rendered question, e.g. "12 + 7". Also the de-duplication key.
    pub display: String,
}

impl Problem {
    fn new(operand_a: u32, operand_b: u32, operator: Operator, answer: u32) -> Self {
        Self {
            operand_a,
            operand_b,
            operator,
            answer,
            display: format!("{} {} {}", operand_a, operator.symbol(), operand_b),
        }
    }

    /// Check a player's answer.
    pub fn check(&self, answer: u32) -> bool {
        self.answer == answer
    }
}

/// Generate one problem using the thread RNG.
///
/// `None` allows every operator. An empty set falls back to addition.
pub fn generate_problem(allowed: Option<&[Operator]>) -> Problem {
    generate_problem_with_rng(&mut rand::rng(), allowed)
}

/// Generate one problem using a specific RNG (for testing/seeding).
pub fn generate_problem_with_rng<R: Rng>(
    rng: &mut R,
    allowed: Option<&[Operator]>,
) -> Problem {
    let ops = allowed.unwrap_or(&Operator::ALL);
    match ops.choose(rng).copied().unwrap_or(Operator::Add) {
        Operator::Add => addition(rng),
        Operator::Subtract => subtraction(rng),
        Operator::Multiply => multiplication(rng),
        Operator::Divide => division(rng),
    }
}

/// Sum at most 100: pick the answer first, then split it.
fn addition<R: Rng>(rng: &mut R) -> Problem {
    let answer = rng.random_range(0..=MAX_VALUE);
    let a = rng.random_range(0..=answer);
    Problem::new(a, answer - a, Operator::Add, answer)
}

/// Never negative: the subtrahend is at most the minuend.
fn subtraction<R: Rng>(rng: &mut R) -> Problem {
    let a = rng.random_range(0..=MAX_VALUE);
    let b = rng.random_range(0..=a);
    Problem::new(a, b, Operator::Subtract, a - b)
}

fn multiplication<R: Rng>(rng: &mut R) -> Problem {
    let a = rng.random_range(0..=MAX_FACTOR);
    let b = rng.random_range(0..=MAX_FACTOR);
    Problem::new(a, b, Operator::Multiply, a * b)
}

/// Exact division: pick quotient and non-zero divisor, derive the dividend.
fn division<R: Rng>(rng: &mut R) -> Problem {
    let quotient = rng.random_range(0..=MAX_FACTOR);
    let divisor = rng.random_range(1..=MAX_FACTOR);
    Problem::new(quotient * divisor, divisor, Operator::Divide, quotient)
}

/// Generate `count` problems with pairwise distinct displays.
pub fn generate_problem_set(count: usize, allowed: Option<&[Operator]>) -> Vec<Problem> {
    generate_problem_set_with_rng(&mut rand::rng(), count, allowed)
}

/// Rejection sampling over `generate_problem_with_rng`.
///
/// There is no attempt cap: asking for more problems than
/// [`problem_space`] allows never returns.
pub fn generate_problem_set_with_rng<R: Rng>(
    rng: &mut R,
    count: usize,
    allowed: Option<&[Operator]>,
) -> Vec<Problem> {
    let space = problem_space(allowed);
    if count > space {
        tracing::warn!(count, space, "requested more unique problems than exist");
    }

    let mut problems = Vec::with_capacity(count);
    let mut seen = HashSet::with_capacity(count);
    while problems.len() < count {
        let problem = generate_problem_with_rng(rng, allowed);
        if seen.insert(problem.display.clone()) {
            problems.push(problem);
        }
    }
    problems
}

/// Number of distinct problem displays the given operators can produce.
pub fn problem_space(allowed: Option<&[Operator]>) -> usize {
    let unique: HashSet<Operator> = match allowed {
        Some([]) => HashSet::from([Operator::Add]),
        Some(ops) => ops.iter().copied().collect(),
        None => Operator::ALL.into_iter().collect(),
    };
    let max = MAX_VALUE as usize;
    let factor = MAX_FACTOR as usize;
    unique
        .iter()
        .map(|op| match op {
            // pairs (a, b) with a + b <= 100, resp. b <= a <= 100
            Operator::Add | Operator::Subtract => (max + 1) * (max + 2) / 2,
            Operator::Multiply => (factor + 1) * (factor + 1),
            Operator::Divide => (factor + 1) * factor,
        })
        .sum()
}
