use crate::models::{HistoryEntry, Level, choice_label};
use crate::session::{Controller, Notice, Phase, QuizSession, Screen, Summary};

const WIDTH: usize = 60;
pub const HISTORY_LIMIT: usize = 50;

fn banner(title: &str) {
    println!("\n{}", "=".repeat(WIDTH));
    println!("  {}", title);
    println!("{}\n", "=".repeat(WIDTH));
}

pub fn render(controller: &Controller) {
    match controller.screen() {
        Screen::Home => render_home(),
        Screen::PackageMenu => render_menu("Choose a Package", controller.packages()),
        Screen::LevelMenu { package } => render_levels(package),
        Screen::DailyMenu => render_menu("Daily Challenge", controller.packages()),
        Screen::History => {
            render_history(controller.history(), HISTORY_LIMIT);
            println!("Press Enter to go back.");
        }
        Screen::InQuiz(session) => render_question(session),
        Screen::Finished(summary) => render_summary(summary),
    }
}

fn render_home() {
    banner("UTBK Practice Quiz");
    println!("  1) Start");
    println!("  2) Daily Challenge");
    println!("  3) History");
    println!("  q) Quit");
    println!();
}

fn render_menu(title: &str, packages: &[String]) {
    banner(title);
    for (i, package) in packages.iter().enumerate() {
        println!("  {}) {}", i + 1, package);
    }
    println!("  b) Back");
    println!();
}

fn render_levels(package: &str) {
    banner(&format!("Package {}", package));
    for (i, level) in Level::ALL.iter().enumerate() {
        println!("  {}) {}", i + 1, level.display_name());
    }
    println!("  b) Back");
    println!();
}

pub fn render_question(session: &QuizSession) {
    let question = session.current();
    let title = if session.mode().is_daily() {
        format!("Daily Challenge - {}", session.mode().package())
    } else {
        format!("UTBK Quiz - {}", session.mode().package())
    };

    println!("\n{}", "=".repeat(WIDTH));
    println!("  {:<40}{:>16}", title, format!("time {}", session.countdown().clock()));
    println!("{}", "=".repeat(WIDTH));
    let tally = if session.mode().is_daily() {
        format!("points {}", session.daily_score())
    } else {
        format!("score {}", session.score())
    };
    println!("Question {}/{}  ({})", session.position() + 1, session.question_count(), tally);
    println!();

    if let Some(reading) = &question.reading {
        println!("{}", reading);
        println!("{}", "-".repeat(WIDTH));
    }
    println!("{}\n", question.question);

    let selected = match session.phase() {
        Phase::Answering { selected } => *selected,
        Phase::Reviewing { choice, .. } => Some(*choice),
    };
    for (i, choice) in question.choices.iter().enumerate() {
        let marker = if selected == Some(i) { '>' } else { ' ' };
        println!(" {} {}) {}", marker, choice_label(i), choice);
    }
    println!();

    match session.phase() {
        Phase::Answering { .. } => {
            println!("Type a letter to answer, or \"back\" to leave the quiz.")
        }
        Phase::Reviewing { .. } => println!("Press Enter for the next question."),
    }
}

pub fn render_notices(notices: &[Notice], screen: &Screen) {
    for notice in notices {
        match notice {
            Notice::Info(msg) => println!("[info] {}", msg),
            Notice::Warning(msg) => println!("[!] {}", msg),
            Notice::Error(msg) => eprintln!("[error] {}", msg),
            Notice::Answered(feedback) => {
                println!("{}", "-".repeat(WIDTH));
                if feedback.correct {
                    println!("Correct! (+{})", feedback.points);
                } else {
                    let answer = match screen {
                        Screen::InQuiz(session) => session
                            .current()
                            .choices
                            .get(feedback.correct_answer)
                            .map(String::as_str)
                            .unwrap_or_default(),
                        _ => "",
                    };
                    println!(
                        "Wrong. The answer is {}) {}",
                        choice_label(feedback.correct_answer),
                        answer
                    );
                }
                if let Some(explanation) = &feedback.explanation {
                    println!("\nExplanation:\n{}", explanation);
                }
                println!("{}", "-".repeat(WIDTH));
            }
            Notice::TimeLeft(seconds) => {
                println!("[time] {} minute(s) left", seconds / 60)
            }
            Notice::TimeUp => println!("[time] Time is up, the session has ended."),
        }
    }
}

fn render_summary(summary: &Summary) {
    banner("Session Complete");
    if summary.timed_out {
        println!("  Time ran out.");
    }
    match summary.entry.daily {
        Some(points) => println!("  Daily points: {}", points),
        None => println!("  Score:        {}/{}", summary.entry.score, summary.questions),
    }
    if !summary.saved {
        println!("  (history could not be saved)");
    }
    println!();
    println!("Press Enter to return home.");
}

pub fn render_packages(packages: &[String]) {
    for package in packages {
        println!("{}", package);
    }
}

pub fn render_history(history: &[HistoryEntry], limit: usize) {
    banner("History");
    if history.is_empty() {
        println!("  No sessions yet.\n");
        return;
    }

    println!("  {:<32} {:<8} {:<7} {:>6}", "Time", "Package", "Mode", "Score");
    println!("  {}", "-".repeat(WIDTH - 4));
    let start = history.len().saturating_sub(limit);
    for entry in &history[start..] {
        let time = if entry.time.is_empty() { "-" } else { entry.time.as_str() };
        let package = entry.package.as_deref().unwrap_or("-").to_uppercase();
        let mode = if entry.is_daily() {
            "daily"
        } else {
            entry.level.as_deref().unwrap_or("-")
        };
        println!(
            "  {:<32} {:<8} {:<7} {:>6}",
            time,
            package,
            mode,
            entry.display_score()
        );
    }
    println!();
}
