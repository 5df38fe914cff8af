//! MathVibe - arithmetic practice for the whole family
//!
//! Practice, beat the clock, or survive on three lives. The `game` module is
//! the engine (problem generator and round state machine); everything else
//! wires it to a terminal and a local SQLite leaderboard.

pub mod app;
pub mod config;
pub mod game;
pub mod storage;
pub mod tui;
