//! Question selection: fresh-first sampling for practice sessions and the
//! date-seeded daily challenge.

use std::collections::HashSet;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::{SliceRandom, index};
use rand::{Rng, SeedableRng};

use crate::models::{HistoryEntry, LevelFilter, Question, QuestionId};

/// Ids already served for `package` across the history.
pub fn used_ids_for_package(history: &[HistoryEntry], package: &str) -> HashSet<QuestionId> {
    history
        .iter()
        .filter(|entry| entry.belongs_to(package))
        .flat_map(|entry| entry.all_ids.iter().cloned())
        .collect()
}

pub fn filter_by_level(pool: &[Question], level: LevelFilter) -> Vec<&Question> {
    pool.iter().filter(|q| level.accepts(q.level)).collect()
}

/// Draws up to `n` questions at `level`, preferring ones never served for
/// `package`. Uses the thread-local CSPRNG.
pub fn select_fresh_priority(
    pool: &[Question],
    n: usize,
    history: &[HistoryEntry],
    package: &str,
    level: LevelFilter,
) -> Vec<Question> {
    select_fresh_priority_with(pool, n, history, package, level, &mut rand::rng())
}

pub fn select_fresh_priority_with<R: Rng + ?Sized>(
    pool: &[Question],
    n: usize,
    history: &[HistoryEntry],
    package: &str,
    level: LevelFilter,
    rng: &mut R,
) -> Vec<Question> {
    let candidates = filter_by_level(pool, level);
    let used = used_ids_for_package(history, package);

    let (fresh, seen): (Vec<&Question>, Vec<&Question>) =
        candidates.into_iter().partition(|q| !used.contains(&q.id));

    let mut selected: Vec<Question> = if fresh.len() >= n {
        sample(&fresh, n, rng)
    } else {
        let mut selected: Vec<Question> = fresh.into_iter().cloned().collect();
        let missing = n - selected.len();
        selected.extend(sample(&seen, missing, rng));
        selected
    };

    selected.shuffle(rng);
    tracing::debug!(package, level = level.as_str(), requested = n, selected = selected.len(), "selected questions");
    selected
}

/// The daily challenge for `date`: identical inputs always give the same
/// questions in the same order.
pub fn daily_select(
    pool: &[Question],
    package: &str,
    level: LevelFilter,
    count: usize,
    date: NaiveDate,
) -> Vec<Question> {
    let candidates = filter_by_level(pool, level);
    if candidates.is_empty() {
        return Vec::new();
    }

    let key = daily_seed_key(date, package, level);
    let mut rng = StdRng::seed_from_u64(fnv1a_64(key.as_bytes()));

    let mut selected = sample(&candidates, count, &mut rng);
    selected.shuffle(&mut rng);
    selected
}

pub fn daily_seed_key(date: NaiveDate, package: &str, level: LevelFilter) -> String {
    format!(
        "{}::{}::{}",
        date.format("%Y-%m-%d"),
        package.trim().to_lowercase(),
        level.as_str()
    )
}

/// 64-bit FNV-1a, used as the daily seed so it is stable across runs and
/// platforms.
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes.iter().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(PRIME)
    })
}

/// Uniform sample without replacement of `min(amount, items.len())` items.
fn sample<R: Rng + ?Sized>(items: &[&Question], amount: usize, rng: &mut R) -> Vec<Question> {
    let amount = amount.min(items.len());
    index::sample(rng, items.len(), amount)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Level;

    fn question(id: &str, level: Option<Level>) -> Question {
        Question {
            id: id.into(),
            package: "PK".to_string(),
            level,
            question: format!("question {}", id),
            choices: vec!["a".into(), "b".into()],
            correct_answer: 0,
            reading: None,
            explanation: None,
        }
    }

    fn pool(count: usize, level: Level) -> Vec<Question> {
        (0..count).map(|i| question(&i.to_string(), Some(level))).collect()
    }

    fn used(package: &str, ids: &[&str]) -> HistoryEntry {
        HistoryEntry::new(0, None, package, "easy", ids.iter().map(|id| (*id).into()).collect())
    }

    fn ids(questions: &[Question]) -> Vec<String> {
        questions.iter().map(|q| q.id.to_string()).collect()
    }

    fn assert_distinct(questions: &[Question]) {
        let unique: HashSet<&QuestionId> = questions.iter().map(|q| &q.id).collect();
        assert_eq!(unique.len(), questions.len());
    }

    #[test]
    fn prefers_unused_questions() {
        let pool = pool(10, Level::Easy);
        let history = vec![used("PK", &["0", "1", "2"])];
        let mut rng = StdRng::seed_from_u64(7);

        let picked = select_fresh_priority_with(
            &pool,
            5,
            &history,
            "pk",
            Level::Easy.into(),
            &mut rng,
        );

        assert_eq!(picked.len(), 5);
        assert_distinct(&picked);
        for id in ids(&picked) {
            assert!(!["0", "1", "2"].contains(&id.as_str()), "{} was already used", id);
        }
    }

    #[test]
    fn tops_up_from_used_questions() {
        let pool = pool(6, Level::Easy);
        let history = vec![used("PK", &["0", "1", "2", "3"])];
        let mut rng = StdRng::seed_from_u64(1);

        let picked =
            select_fresh_priority_with(&pool, 4, &history, "PK", LevelFilter::All, &mut rng);

        assert_eq!(picked.len(), 4);
        assert_distinct(&picked);
        let picked_ids = ids(&picked);
        assert!(picked_ids.contains(&"4".to_string()));
        assert!(picked_ids.contains(&"5".to_string()));
    }

    #[test]
    fn history_of_other_packages_is_ignored() {
        let pool = pool(3, Level::Easy);
        let history = vec![used("PM", &["0", "1"])];
        let mut rng = StdRng::seed_from_u64(3);

        let picked =
            select_fresh_priority_with(&pool, 3, &history, "PK", LevelFilter::All, &mut rng);
        assert_eq!(picked.len(), 3);
        assert!(used_ids_for_package(&history, "PK").is_empty());
    }

    #[test]
    fn size_is_min_of_n_and_filtered_pool() {
        let mut mixed = pool(4, Level::Easy);
        mixed.extend((10..13).map(|i| question(&i.to_string(), Some(Level::Hard))));
        mixed.push(question("untagged", None));
        let history = vec![used("PK", &["0", "10"])];
        let mut rng = StdRng::seed_from_u64(11);

        for n in 0..10 {
            let easy =
                select_fresh_priority_with(&mixed, n, &history, "PK", Level::Easy.into(), &mut rng);
            assert_eq!(easy.len(), n.min(5));
            assert_distinct(&easy);
            assert!(easy.iter().all(|q| q.level != Some(Level::Hard)));

            let all = select_fresh_priority_with(&mixed, n, &history, "PK", LevelFilter::All, &mut rng);
            assert_eq!(all.len(), n.min(8));
            assert_distinct(&all);
        }
    }

    #[test]
    fn empty_pool_selects_nothing() {
        assert!(select_fresh_priority(&[], 5, &[], "PK", LevelFilter::All).is_empty());
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(daily_select(&[], "PK", LevelFilter::All, 5, today).is_empty());
    }

    #[test]
    fn daily_is_deterministic() {
        let pool = pool(30, Level::Medium);
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let first = daily_select(&pool, "PK", LevelFilter::All, 5, day);
        let second = daily_select(&pool, "pk ", LevelFilter::All, 5, day);
        assert_eq!(first.len(), 5);
        assert_distinct(&first);
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn daily_changes_with_the_date() {
        let pool = pool(30, Level::Medium);
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let base = ids(&daily_select(&pool, "PK", LevelFilter::All, 5, start));

        let differing = (1..=7)
            .filter_map(|d| start.checked_add_days(chrono::Days::new(d)))
            .filter(|day| ids(&daily_select(&pool, "PK", LevelFilter::All, 5, *day)) != base)
            .count();
        assert!(differing >= 6);
    }

    #[test]
    fn daily_caps_at_pool_size() {
        let pool = pool(3, Level::Hard);
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(daily_select(&pool, "PK", Level::Hard.into(), 5, day).len(), 3);
        assert!(daily_select(&pool, "PK", Level::Easy.into(), 5, day).is_empty());
    }

    #[test]
    fn seed_key_format() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(daily_seed_key(day, " PK ", LevelFilter::All), "2024-01-09::pk::all");
        assert_eq!(
            daily_seed_key(day, "pu", Level::Hard.into()),
            "2024-01-09::pu::hard"
        );
    }

    #[test]
    fn fnv_reference_values() {
        assert_eq!(fnv1a_64(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a_64(b"a"), 0xaf63dc4c8601ec8c);
    }
}
