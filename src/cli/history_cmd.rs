use crate::display::render_history;
use crate::models::config;

pub fn show_history(limit: usize) {
    let user_config = config::load_config();
    let store = super::open_store(&user_config);
    let log = store.load_history();
    let history = log.entries();

    render_history(history, limit);

    let sessions = history.iter().filter(|h| !h.is_daily()).count();
    let best_daily = history.iter().filter_map(|h| h.daily).max();
    println!("Practice sessions: {}", sessions);
    println!("Daily challenges:  {}", history.len() - sessions);
    if let Some(best) = best_daily {
        println!("Best daily score:  {}", best);
    }
    println!();
    println!("History file: {}", store.history_path().display());
}
