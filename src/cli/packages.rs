use crate::display::render_packages;
use crate::models::config;

pub fn list_packages() {
    let user_config = config::load_config();
    let store = super::open_store(&user_config);

    if store.load_questions().is_empty() {
        eprintln!(
            "No questions found in {}; showing the default packages.",
            store.questions_path().display()
        );
    }
    render_packages(&store.packages());
}
