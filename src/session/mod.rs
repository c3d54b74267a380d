//! Quiz flow: the per-session state and the screen state machine that
//! drives it.

pub mod controller;
pub mod quiz;

pub use controller::{Action, Controller, Notice, Screen, Summary};
pub use quiz::{Phase, QuizSession};
