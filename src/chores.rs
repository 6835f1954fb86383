//! Chore prioritization.
//!
//! Pure "how overdue is it" computation over the chore list and each
//! chore's most recent completion. Recomputed from the store on every
//! refresh; nothing here is cached.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::database::models::Chore;

/// A chore together with its staleness relative to its cadence.
#[derive(Debug, Clone, Serialize)]
pub struct ChoreStatus {
    pub chore: Chore,
    /// Whole days since the last logged completion. None if never done.
    pub days_since_done: Option<i64>,
    /// `days_since_done - cadence_days`. Positive means overdue. None if
    /// never done.
    pub days_overdue: Option<i64>,
}

impl ChoreStatus {
    pub fn is_overdue(&self) -> bool {
        self.days_overdue.map_or(true, |d| d > 0)
    }
}

/// Builds the prioritized chore list: never-completed chores first, then
/// most-overdue first, ties broken by name so the ordering is stable
/// across refreshes.
pub fn prioritize(
    chores: Vec<Chore>,
    last_done: &HashMap<i64, NaiveDate>,
    today: NaiveDate,
) -> Vec<ChoreStatus> {
    let mut statuses: Vec<ChoreStatus> = chores
        .into_iter()
        .map(|chore| {
            let days_since_done = last_done
                .get(&chore.chore_id)
                .map(|done| today.signed_duration_since(*done).num_days());
            let days_overdue = days_since_done.map(|d| d - chore.cadence_days);
            ChoreStatus {
                chore,
                days_since_done,
                days_overdue,
            }
        })
        .collect();

    statuses.sort_by(|a, b| match (a.days_overdue, b.days_overdue) {
        (None, None) => a.chore.name.cmp(&b.chore.name),
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.chore.name.cmp(&b.chore.name)),
    });
    statuses
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chore(id: i64, name: &str, cadence_days: i64) -> Chore {
        Chore {
            chore_id: id,
            name: name.into(),
            cadence_days,
            created_on: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn never_done_sorts_before_overdue() {
        let today = date(2025, 6, 15);
        let mut last = HashMap::new();
        last.insert(1, date(2025, 6, 1));

        let out = prioritize(vec![chore(1, "dishes", 2), chore(2, "gutters", 90)], &last, today);
        assert_eq!(out[0].chore.name, "gutters");
        assert_eq!(out[0].days_since_done, None);
        assert!(out[0].is_overdue());
        assert_eq!(out[1].days_overdue, Some(12));
    }

    #[test]
    fn most_overdue_first_with_name_tiebreak() {
        let today = date(2025, 6, 15);
        let mut last = HashMap::new();
        last.insert(1, date(2025, 6, 10)); // 5 days since, cadence 7 -> -2
        last.insert(2, date(2025, 6, 1)); // 14 days since, cadence 7 -> 7
        last.insert(3, date(2025, 6, 1)); // 14 days since, cadence 7 -> 7

        let out = prioritize(
            vec![chore(1, "vacuum", 7), chore(2, "mop", 7), chore(3, "laundry", 7)],
            &last,
            today,
        );
        let names: Vec<&str> = out.iter().map(|s| s.chore.name.as_str()).collect();
        assert_eq!(names, vec!["laundry", "mop", "vacuum"]);
        assert!(!out[2].is_overdue());
    }

    #[test]
    fn done_today_is_not_overdue() {
        let today = date(2025, 6, 15);
        let mut last = HashMap::new();
        last.insert(1, today);
        let out = prioritize(vec![chore(1, "dishes", 1)], &last, today);
        assert_eq!(out[0].days_since_done, Some(0));
        assert_eq!(out[0].days_overdue, Some(-1));
        assert!(!out[0].is_overdue());
    }
}
