use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::display;
use crate::models::{Level, config, label_index};
use crate::session::{Action, Controller, Notice, Phase, Screen};

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Actions(Vec<Action>),
    Quit,
    Unknown,
}

pub fn play(initial: Option<Action>) {
    let user_config = config::load_config();
    let store = super::open_store(&user_config);
    let mut controller = Controller::new(store, user_config);

    let notices = match initial {
        Some(action) => controller.handle(action),
        None => Vec::new(),
    };
    display::render(&controller);
    display::render_notices(&notices, controller.screen());

    run_loop(&mut controller);
}

/// Single-threaded event loop. While a quiz is on screen the wait for input
/// is bounded by the next one-second tick; otherwise it blocks.
fn run_loop(controller: &mut Controller) {
    let input = spawn_input_reader();
    let mut next_tick: Option<Instant> = None;
    let mut show_prompt = true;

    loop {
        next_tick = if controller.timer_active() {
            Some(next_tick.unwrap_or_else(|| Instant::now() + TICK))
        } else {
            None
        };

        if show_prompt {
            print!("> ");
            let _ = io::stdout().flush();
            show_prompt = false;
        }

        let received = match next_tick {
            Some(deadline) => input.recv_timeout(deadline.saturating_duration_since(Instant::now())),
            None => input.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(line) => {
                show_prompt = true;
                match parse_input(controller.screen(), controller.packages(), &line) {
                    Input::Quit => break,
                    Input::Unknown => println!("[!] Unrecognised input: {}", line.trim()),
                    Input::Actions(actions) => {
                        let notices = dispatch(controller, actions);
                        display::render(controller);
                        display::render_notices(&notices, controller.screen());
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                next_tick = next_tick.map(|t| t + TICK);
                let notices = controller.handle(Action::Tick);
                if notices.is_empty() {
                    continue;
                }
                println!();
                if !controller.timer_active() {
                    display::render(controller);
                }
                display::render_notices(&notices, controller.screen());
                show_prompt = true;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Applies actions in order, stopping at the first warning.
fn dispatch(controller: &mut Controller, actions: Vec<Action>) -> Vec<Notice> {
    let mut notices = Vec::new();
    for action in actions {
        let produced = controller.handle(action);
        let warned = produced.iter().any(|n| matches!(n, Notice::Warning(_)));
        notices.extend(produced);
        if warned {
            break;
        }
    }
    notices
}

fn spawn_input_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn parse_input(screen: &Screen, packages: &[String], line: &str) -> Input {
    let text = line.trim();
    let lower = text.to_lowercase();
    let one = |action| Input::Actions(vec![action]);

    match screen {
        Screen::Home => match lower.as_str() {
            "1" | "start" => one(Action::OpenPackages),
            "2" | "daily" => one(Action::OpenDaily),
            "3" | "history" => one(Action::OpenHistory),
            "q" | "quit" => Input::Quit,
            _ => Input::Unknown,
        },
        Screen::PackageMenu | Screen::DailyMenu => match lower.as_str() {
            "b" | "back" => one(Action::Back),
            "q" | "quit" => Input::Quit,
            _ => match pick_package(packages, text) {
                Some(package) if matches!(screen, Screen::PackageMenu) => {
                    one(Action::ChoosePackage(package))
                }
                Some(package) => one(Action::StartDaily(package)),
                None => Input::Unknown,
            },
        },
        Screen::LevelMenu { package } => match lower.as_str() {
            "b" | "back" => one(Action::Back),
            "q" | "quit" => Input::Quit,
            _ => match pick_level(&lower) {
                Some(level) => one(Action::StartPractice {
                    package: package.clone(),
                    level,
                }),
                None => Input::Unknown,
            },
        },
        Screen::History => match lower.as_str() {
            "q" | "quit" => Input::Quit,
            _ => one(Action::Advance),
        },
        Screen::Finished(_) => one(Action::Advance),
        Screen::InQuiz(session) => {
            if lower == "back" {
                return one(Action::Back);
            }
            match session.phase() {
                Phase::Answering { .. } if text.is_empty() => one(Action::Advance),
                Phase::Answering { .. } => match single_char(text).and_then(label_index) {
                    Some(choice) => Input::Actions(vec![Action::Select(choice), Action::Advance]),
                    None => Input::Unknown,
                },
                Phase::Reviewing { .. } if text.is_empty() || lower == "n" => {
                    one(Action::Advance)
                }
                Phase::Reviewing { .. } => Input::Unknown,
            }
        }
    }
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// A 1-based menu number or a package name.
fn pick_package(packages: &[String], text: &str) -> Option<String> {
    if let Ok(n) = text.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| packages.get(i)).cloned();
    }
    packages
        .iter()
        .find(|p| p.eq_ignore_ascii_case(text))
        .cloned()
}

fn pick_level(text: &str) -> Option<Level> {
    if let Ok(n) = text.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| Level::ALL.get(i)).copied();
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;
    use crate::session::QuizSession;
    use crate::session::quiz::QuizMode;

    fn packages() -> Vec<String> {
        vec!["PK".to_string(), "PU".to_string()]
    }

    fn quiz() -> Screen {
        let question = Question {
            id: "1".into(),
            package: "PK".into(),
            level: Some(Level::Easy),
            question: "?".into(),
            choices: vec!["x".into(), "y".into()],
            correct_answer: 0,
            reading: None,
            explanation: None,
        };
        let mode = QuizMode::Practice { package: "PK".into(), level: Level::Easy };
        Screen::InQuiz(QuizSession::new(mode, vec![question], 60).unwrap())
    }

    #[test]
    fn home_menu() {
        assert_eq!(
            parse_input(&Screen::Home, &packages(), " 2 "),
            Input::Actions(vec![Action::OpenDaily])
        );
        assert_eq!(parse_input(&Screen::Home, &packages(), "q"), Input::Quit);
        assert_eq!(parse_input(&Screen::Home, &packages(), "x"), Input::Unknown);
    }

    #[test]
    fn package_menus_by_number_or_name() {
        assert_eq!(
            parse_input(&Screen::PackageMenu, &packages(), "2"),
            Input::Actions(vec![Action::ChoosePackage("PU".into())])
        );
        assert_eq!(
            parse_input(&Screen::DailyMenu, &packages(), "pk"),
            Input::Actions(vec![Action::StartDaily("PK".into())])
        );
        assert_eq!(parse_input(&Screen::PackageMenu, &packages(), "0"), Input::Unknown);
        assert_eq!(parse_input(&Screen::PackageMenu, &packages(), "9"), Input::Unknown);
    }

    #[test]
    fn level_menu() {
        let screen = Screen::LevelMenu { package: "PK".into() };
        assert_eq!(
            parse_input(&screen, &packages(), "3"),
            Input::Actions(vec![Action::StartPractice { package: "PK".into(), level: Level::Hard }])
        );
        assert_eq!(
            parse_input(&screen, &packages(), "medium"),
            Input::Actions(vec![Action::StartPractice { package: "PK".into(), level: Level::Medium }])
        );
        assert_eq!(parse_input(&screen, &packages(), "b"), Input::Actions(vec![Action::Back]));
    }

    #[test]
    fn quiz_letters_select_and_submit() {
        let screen = quiz();
        assert_eq!(
            parse_input(&screen, &packages(), "B"),
            Input::Actions(vec![Action::Select(1), Action::Advance])
        );
        assert_eq!(parse_input(&screen, &packages(), ""), Input::Actions(vec![Action::Advance]));
        assert_eq!(parse_input(&screen, &packages(), "back"), Input::Actions(vec![Action::Back]));
        assert_eq!(parse_input(&screen, &packages(), "42"), Input::Unknown);
    }

    #[test]
    fn reviewing_only_advances() {
        let Screen::InQuiz(mut session) = quiz() else {
            unreachable!()
        };
        session.select(0).unwrap();
        session.submit_answer().unwrap();
        let screen = Screen::InQuiz(session);

        assert_eq!(parse_input(&screen, &packages(), ""), Input::Actions(vec![Action::Advance]));
        assert_eq!(parse_input(&screen, &packages(), "a"), Input::Unknown);
    }
}
