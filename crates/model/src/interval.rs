//! Half-open time intervals `[lo, hi)` with `±∞` endpoints.
//!
//! This is the whole interval algebra the pricing slicer composes from
//! (C1): intersection, strict overlap, clipping, and the ordering used to
//! make slicing and report output deterministic.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

/// An interval endpoint: a concrete instant, or one of the two infinities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    NegInf,
    At(DateTime<Utc>),
    PosInf,
}

impl Bound {
    pub fn as_instant(self) -> Option<DateTime<Utc>> {
        match self {
            Bound::At(t) => Some(t),
            _ => None,
        }
    }
}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bound {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Bound::NegInf, Bound::NegInf) => Ordering::Equal,
            (Bound::PosInf, Bound::PosInf) => Ordering::Equal,
            (Bound::NegInf, _) => Ordering::Less,
            (_, Bound::NegInf) => Ordering::Greater,
            (Bound::PosInf, _) => Ordering::Greater,
            (_, Bound::PosInf) => Ordering::Less,
            (Bound::At(a), Bound::At(b)) => a.cmp(b),
        }
    }
}

/// A half-open range `[lo, hi)`. Callers are expected to maintain `lo < hi`;
/// [`Interval::new`] enforces it and returns [`None`] otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    lo: Bound,
    hi: Bound,
}

impl Interval {
    /// Builds `[lo, hi)`. Returns `None` if the range would be empty or
    /// inverted (`lo >= hi`).
    pub fn new(lo: Bound, hi: Bound) -> Option<Self> {
        (lo < hi).then_some(Self { lo, hi })
    }

    pub fn bounded(lo: DateTime<Utc>, hi: DateTime<Utc>) -> Option<Self> {
        Self::new(Bound::At(lo), Bound::At(hi))
    }

    pub fn unbounded_after(lo: DateTime<Utc>) -> Self {
        Self {
            lo: Bound::At(lo),
            hi: Bound::PosInf,
        }
    }

    pub fn unbounded_before(hi: DateTime<Utc>) -> Self {
        Self {
            lo: Bound::NegInf,
            hi: Bound::At(hi),
        }
    }

    pub fn everything() -> Self {
        Self {
            lo: Bound::NegInf,
            hi: Bound::PosInf,
        }
    }

    pub fn lo(&self) -> Bound {
        self.lo
    }

    pub fn hi(&self) -> Bound {
        self.hi
    }

    /// Seconds of width, if both endpoints are finite. Used by the formula
    /// evaluator's `$time_in_seconds` variable.
    pub fn duration_seconds(&self) -> Option<rust_decimal::Decimal> {
        let lo = self.lo.as_instant()?;
        let hi = self.hi.as_instant()?;
        let micros = (hi - lo).num_microseconds()?;
        Some(rust_decimal::Decimal::new(micros, 6))
    }

    pub fn contains_instant(&self, t: DateTime<Utc>) -> bool {
        self.lo <= Bound::At(t) && Bound::At(t) < self.hi
    }

    /// `intersect(a, b)` — `[max(lo), min(hi))` if non-empty, else `None`.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        Self::new(lo, hi)
    }

    /// `clip(a, b)` is exactly `intersect(a, b)`, returning `None` for ⊥.
    pub fn clip(&self, other: &Self) -> Option<Self> {
        self.intersect(other)
    }

    /// Strict overlap: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.lo < other.hi && other.lo < self.hi
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        other.lo <= self.lo && self.hi <= other.hi
    }
}

impl PartialOrd for Interval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ranges sort by `lo` ascending, then `hi` ascending (§4.1).
impl Ord for Interval {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lo.cmp(&other.lo).then(self.hi.cmp(&other.hi))
    }
}

/// Partitions `within` at every boundary in `cuts`, returning the maximal
/// sub-intervals of `within` over which no cut point falls strictly inside.
///
/// Used by the pricing slicer (§4.5 step 5) to split a plan window at every
/// VAT/currency validity boundary.
pub fn partition_at(within: Interval, mut cuts: Vec<Bound>) -> Vec<Interval> {
    cuts.retain(|&c| within.lo < c && c < within.hi);
    cuts.sort();
    cuts.dedup();

    let mut points = vec![within.lo];
    points.extend(cuts);
    points.push(within.hi);

    points
        .windows(2)
        .filter_map(|w| Interval::new(w[0], w[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> DateTime<Utc> {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ").unwrap().and_utc()
    }

    #[test]
    fn intersect_overlapping() {
        let a = Interval::bounded(t("2020-01-01T00:00:00Z"), t("2020-01-02T00:00:00Z")).unwrap();
        let b = Interval::bounded(t("2020-01-01T12:00:00Z"), t("2020-01-03T00:00:00Z")).unwrap();
        let i = a.intersect(&b).unwrap();
        assert_eq!(i.lo(), Bound::At(t("2020-01-01T12:00:00Z")));
        assert_eq!(i.hi(), Bound::At(t("2020-01-02T00:00:00Z")));
    }

    #[test]
    fn touching_does_not_overlap() {
        let a = Interval::bounded(t("2020-01-01T00:00:00Z"), t("2020-01-02T00:00:00Z")).unwrap();
        let b = Interval::bounded(t("2020-01-02T00:00:00Z"), t("2020-01-03T00:00:00Z")).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn partition_splits_at_internal_cuts() {
        let within = Interval::bounded(t("2020-01-01T00:00:00Z"), t("2020-04-01T00:00:00Z")).unwrap();
        let cuts = vec![
            Bound::At(t("2020-02-01T00:00:00Z")),
            Bound::At(t("2020-03-01T00:00:00Z")),
        ];
        let parts = partition_at(within, cuts);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].hi(), Bound::At(t("2020-02-01T00:00:00Z")));
        assert_eq!(parts[2].lo(), Bound::At(t("2020-03-01T00:00:00Z")));
    }

    #[test]
    fn ordering_tie_break() {
        let a = Interval::bounded(t("2020-01-01T00:00:00Z"), t("2020-01-02T00:00:00Z")).unwrap();
        let b = Interval::bounded(t("2020-01-01T00:00:00Z"), t("2020-01-03T00:00:00Z")).unwrap();
        assert!(a < b);
    }

    #[test]
    fn infinite_bounds_order_correctly() {
        assert!(Bound::NegInf < Bound::At(t("2020-01-01T00:00:00Z")));
        assert!(Bound::At(t("2020-01-01T00:00:00Z")) < Bound::PosInf);
    }
}
