//! Derives the `valid_for` half-open window of a versioned configuration row
//! (plan/VAT/currency) from its neighbours, ordered by `valid_from` (§3).
//!
//! A row's window runs from its own `valid_from` up to the next row's
//! `valid_from` *for the same key*, or `+∞` if it is the latest version.

use chrono::{DateTime, Utc};

use crate::interval::Interval;

/// Given all `valid_from` timestamps for one key, sorted ascending, and the
/// index of one of them, returns its effective window.
pub fn effective_window(sorted_valid_froms: &[DateTime<Utc>], index: usize) -> Interval {
    let lo = sorted_valid_froms[index];
    match sorted_valid_froms.get(index + 1) {
        Some(&next) => Interval::unbounded_after(lo).intersect(&Interval::unbounded_before(next)),
        None => Some(Interval::unbounded_after(lo)),
    }
    .expect("valid_from rows are strictly increasing")
}

/// Computes `(value, valid_for)` pairs for a set of versioned rows sharing a
/// key, given their `valid_from` timestamps in arbitrary order.
pub fn windows_for<'a, T>(rows: &'a [(DateTime<Utc>, T)]) -> Vec<(&'a T, Interval)> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by_key(|&i| rows[i].0);
    let valid_froms: Vec<DateTime<Utc>> = order.iter().map(|&i| rows[i].0).collect();

    order
        .iter()
        .enumerate()
        .map(|(pos, &i)| (&rows[i].1, effective_window(&valid_froms, pos)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> DateTime<Utc> {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ").unwrap().and_utc()
    }

    #[test]
    fn latest_version_is_open_ended() {
        let rows = vec![(t("2020-01-01T00:00:00Z"), "v1"), (t("2020-02-01T00:00:00Z"), "v2")];
        let windows = windows_for(&rows);
        assert_eq!(windows[1].0, &"v2");
        assert_eq!(windows[1].1.hi(), crate::interval::Bound::PosInf);
        assert_eq!(windows[0].1.hi(), crate::interval::Bound::At(t("2020-02-01T00:00:00Z")));
    }
}
