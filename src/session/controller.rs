use chrono::{Local, NaiveDate};

use crate::models::config::UserConfig;
use crate::models::{HistoryEntry, HistoryLog, Level, LevelFilter};
use crate::selector::{daily_select, select_fresh_priority};
use crate::store::Store;

use super::quiz::{Feedback, QuizMode, QuizSession, Step};

/// Remaining seconds at which the player is warned.
const TIME_WARNINGS: [u32; 2] = [5 * 60, 60];

#[derive(Debug, Clone)]
pub enum Screen {
    Home,
    PackageMenu,
    LevelMenu { package: String },
    DailyMenu,
    History,
    InQuiz(QuizSession),
    Finished(Summary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub entry: HistoryEntry,
    pub questions: usize,
    pub timed_out: bool,
    pub saved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    OpenPackages,
    OpenDaily,
    OpenHistory,
    ChoosePackage(String),
    StartPractice { package: String, level: Level },
    StartDaily(String),
    Select(usize),
    Advance,
    Tick,
    Back,
}

/// Messages for the player produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
    Answered(Feedback),
    TimeLeft(u32),
    TimeUp,
}

/// Everything the transitions read or update besides the screen itself.
#[derive(Debug)]
pub struct Context {
    store: Store,
    config: UserConfig,
    history: HistoryLog,
    packages: Vec<String>,
}

impl Context {
    pub fn new(store: Store, config: UserConfig) -> Self {
        let history = store.load_history();
        let packages = store.packages();
        tracing::debug!(entries = history.len(), packages = packages.len(), "loaded quiz data");

        Self {
            store,
            config,
            history,
            packages,
        }
    }

    fn start_practice(&self, package: &str, level: Level) -> Option<QuizSession> {
        let pool = self.store.questions_for_package(package);
        let questions = select_fresh_priority(
            &pool,
            self.config.questions_per_level,
            self.history.entries(),
            &package.to_lowercase(),
            LevelFilter::Only(level),
        );

        let mode = QuizMode::Practice {
            package: package.to_string(),
            level,
        };
        QuizSession::new(mode, questions, self.config.session_seconds)
    }

    fn start_daily(&self, package: &str, today: NaiveDate) -> Option<QuizSession> {
        let pool: Vec<_> = self
            .store
            .questions_for_package(package)
            .into_iter()
            .filter(|q| q.level.is_some())
            .collect();
        let questions = daily_select(
            &pool,
            package,
            LevelFilter::All,
            self.config.daily_questions,
            today,
        );

        let mode = QuizMode::Daily {
            package: package.to_string(),
        };
        QuizSession::new(mode, questions, self.config.session_seconds)
    }

    /// Records the session and persists the whole history.
    fn finish(&mut self, session: QuizSession, timed_out: bool, notices: &mut Vec<Notice>) -> Screen {
        let entry = session.to_history_entry();
        self.history.push(entry.clone());

        let saved = match self.store.save_history(&self.history) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "failed to save history");
                notices.push(Notice::Error(format!("Failed to save history: {}", e)));
                false
            }
        };

        tracing::info!(
            id = %entry.id,
            score = entry.score,
            daily = ?entry.daily,
            timed_out,
            "session finished"
        );

        Screen::Finished(Summary {
            entry,
            questions: session.question_count(),
            timed_out,
            saved,
        })
    }
}

pub struct Controller {
    screen: Screen,
    ctx: Context,
}

impl Controller {
    pub fn new(store: Store, config: UserConfig) -> Self {
        Self {
            screen: Screen::Home,
            ctx: Context::new(store, config),
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn packages(&self) -> &[String] {
        &self.ctx.packages
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.ctx.history.entries()
    }

    /// The countdown only runs while a quiz is on screen.
    pub fn timer_active(&self) -> bool {
        matches!(self.screen, Screen::InQuiz(_))
    }

    pub fn handle(&mut self, action: Action) -> Vec<Notice> {
        let screen = std::mem::replace(&mut self.screen, Screen::Home);
        let (next, notices) = transition(screen, action, &mut self.ctx);
        self.screen = next;
        notices
    }
}

pub fn transition(screen: Screen, action: Action, ctx: &mut Context) -> (Screen, Vec<Notice>) {
    transition_on(screen, action, ctx, Local::now().date_naive())
}

fn transition_on(
    screen: Screen,
    action: Action,
    ctx: &mut Context,
    today: NaiveDate,
) -> (Screen, Vec<Notice>) {
    let mut notices = Vec::new();

    let next = match (screen, action) {
        (Screen::InQuiz(session), action) => quiz_transition(session, action, ctx, &mut notices),

        (_, Action::StartPractice { package, level }) => {
            match ctx.start_practice(&package, level) {
                Some(session) => Screen::InQuiz(session),
                None => {
                    notices.push(Notice::Info(format!(
                        "No {} questions available for {}",
                        level.display_name(),
                        package
                    )));
                    Screen::Home
                }
            }
        }
        (_, Action::StartDaily(package)) => match ctx.start_daily(&package, today) {
            Some(session) => Screen::InQuiz(session),
            None => {
                notices.push(Notice::Info(format!(
                    "No daily challenge available for {}",
                    package
                )));
                Screen::Home
            }
        },

        (Screen::Home, Action::OpenPackages) => Screen::PackageMenu,
        (Screen::Home, Action::OpenDaily) => Screen::DailyMenu,
        (Screen::Home, Action::OpenHistory) => Screen::History,
        (Screen::PackageMenu, Action::ChoosePackage(package)) => Screen::LevelMenu { package },
        (Screen::LevelMenu { .. }, Action::Back) => Screen::PackageMenu,
        (Screen::History | Screen::Finished(_), Action::Advance) => Screen::Home,
        (_, Action::Back) => Screen::Home,

        (screen, Action::Tick) => screen,
        (screen, action) => {
            tracing::debug!(?action, "action ignored on this screen");
            screen
        }
    };

    (next, notices)
}

fn quiz_transition(
    mut session: QuizSession,
    action: Action,
    ctx: &mut Context,
    notices: &mut Vec<Notice>,
) -> Screen {
    match action {
        Action::Select(choice) => {
            if let Err(e) = session.select(choice) {
                notices.push(Notice::Warning(e.to_string()));
            }
            Screen::InQuiz(session)
        }
        Action::Advance => match session.advance() {
            Ok(Step::Answered(feedback)) => {
                notices.push(Notice::Answered(feedback));
                Screen::InQuiz(session)
            }
            Ok(Step::Next) => Screen::InQuiz(session),
            Ok(Step::Finished) => ctx.finish(session, false, notices),
            Err(e) => {
                notices.push(Notice::Warning(e.to_string()));
                Screen::InQuiz(session)
            }
        },
        Action::Tick => {
            if session.tick() {
                notices.push(Notice::TimeUp);
                return ctx.finish(session, true, notices);
            }
            let remaining = session.countdown().remaining();
            if TIME_WARNINGS.contains(&remaining) {
                notices.push(Notice::TimeLeft(remaining));
            }
            Screen::InQuiz(session)
        }
        Action::Back => {
            tracing::info!(package = session.mode().package(), "quiz abandoned");
            Screen::Home
        }
        other => {
            tracing::debug!(action = ?other, "action ignored during a quiz");
            Screen::InQuiz(session)
        }
    }
}
