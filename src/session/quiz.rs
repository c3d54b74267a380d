use thiserror::Error;

use crate::models::{HistoryEntry, Level, LevelFilter, Question};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("choose an answer first")]
    NoAnswerChosen,
    #[error("this question has already been answered")]
    AlreadyAnswered,
    #[error("choice {choice} is not one of the {len} options")]
    InvalidChoice { choice: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizMode {
    Practice { package: String, level: Level },
    Daily { package: String },
}

impl QuizMode {
    pub fn package(&self) -> &str {
        match self {
            QuizMode::Practice { package, .. } | QuizMode::Daily { package } => package,
        }
    }

    pub fn level_filter(&self) -> LevelFilter {
        match self {
            QuizMode::Practice { level, .. } => LevelFilter::Only(*level),
            QuizMode::Daily { .. } => LevelFilter::All,
        }
    }

    pub fn is_daily(&self) -> bool {
        matches!(self, QuizMode::Daily { .. })
    }
}

/// Session countdown, advanced once per second by the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self { remaining: seconds }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Counts down one second. Returns true once time has run out.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Answering { selected: Option<usize> },
    Reviewing { choice: usize, correct: bool },
}

/// Result of checking one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    pub correct_answer: usize,
    pub points: u32,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Answered(Feedback),
    Next,
    Finished,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    mode: QuizMode,
    questions: Vec<Question>,
    index: usize,
    score: u32,
    daily_score: u32,
    phase: Phase,
    countdown: Countdown,
}

impl QuizSession {
    /// Returns `None` when there is nothing to ask.
    pub fn new(mode: QuizMode, questions: Vec<Question>, session_seconds: u32) -> Option<Self> {
        if questions.is_empty() {
            return None;
        }

        Some(Self {
            mode,
            questions,
            index: 0,
            score: 0,
            daily_score: 0,
            phase: Phase::Answering { selected: None },
            countdown: Countdown::new(session_seconds),
        })
    }

    pub fn mode(&self) -> &QuizMode {
        &self.mode
    }

    pub fn current(&self) -> &Question {
        &self.questions[self.index]
    }

    /// Zero-based position of the current question.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn daily_score(&self) -> u32 {
        self.daily_score
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn tick(&mut self) -> bool {
        self.countdown.tick()
    }

    pub fn select(&mut self, choice: usize) -> Result<(), SessionError> {
        let len = self.current().choices.len();
        match &mut self.phase {
            Phase::Reviewing { .. } => Err(SessionError::AlreadyAnswered),
            Phase::Answering { .. } if choice >= len => {
                Err(SessionError::InvalidChoice { choice, len })
            }
            Phase::Answering { selected } => {
                *selected = Some(choice);
                Ok(())
            }
        }
    }

    /// Locks in the selected choice and scores it. Daily sessions earn
    /// the question's level points, practice sessions one point.
    pub fn submit_answer(&mut self) -> Result<Feedback, SessionError> {
        let choice = match self.phase {
            Phase::Reviewing { .. } => return Err(SessionError::AlreadyAnswered),
            Phase::Answering { selected: None } => return Err(SessionError::NoAnswerChosen),
            Phase::Answering { selected: Some(choice) } => choice,
        };

        let question = &self.questions[self.index];
        let correct = question.is_correct(choice);
        let mut points = 0;
        if correct {
            if self.mode.is_daily() {
                points = question.points();
                self.daily_score += points;
            } else {
                points = 1;
                self.score += 1;
            }
        }

        let feedback = Feedback {
            correct,
            correct_answer: question.correct_answer,
            points,
            explanation: question.explanation.clone(),
        };
        self.phase = Phase::Reviewing { choice, correct };
        Ok(feedback)
    }

    /// Submits a pending answer, or moves past an answered question.
    pub fn advance(&mut self) -> Result<Step, SessionError> {
        if let Phase::Answering { .. } = self.phase {
            return self.submit_answer().map(Step::Answered);
        }

        if self.index + 1 < self.questions.len() {
            self.index += 1;
            self.phase = Phase::Answering { selected: None };
            Ok(Step::Next)
        } else {
            Ok(Step::Finished)
        }
    }

    pub fn to_history_entry(&self) -> HistoryEntry {
        let daily = self.mode.is_daily().then_some(self.daily_score);
        HistoryEntry::new(
            self.score,
            daily,
            &self.mode.package().to_lowercase(),
            self.mode.level_filter().as_str(),
            self.questions.iter().map(|q| q.id.clone()).collect(),
        )
    }
}
