use super::filter::FilterCriteria;
use super::model::{CourseRecord, CourseStore};
use crate::error::Result;

/// Average reported for every field when no record matches.
pub const NO_DATA: f64 = -1.0;

// ---------------------------------------------------------------------------
// CourseStats – summary of one filtered subset
// ---------------------------------------------------------------------------

/// Record count and the four numeric averages of a filtered subset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseStats {
    pub record_count: usize,
    pub avg_hours_per_week: f64,
    pub avg_course_duration: f64,
    pub avg_completion_percent: f64,
    pub avg_satisfaction_score: f64,
}

impl CourseStats {
    /// Result for an empty match: zero records, every average [`NO_DATA`].
    pub const fn empty() -> Self {
        Self {
            record_count: 0,
            avg_hours_per_week: NO_DATA,
            avg_course_duration: NO_DATA,
            avg_completion_percent: NO_DATA,
            avg_satisfaction_score: NO_DATA,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

/// Running sums, accumulated in store order.
#[derive(Default)]
struct Totals {
    count: usize,
    hours: f64,
    duration: f64,
    completion: f64,
    satisfaction: f64,
}

impl Totals {
    fn add(&mut self, record: &CourseRecord) {
        self.count += 1;
        self.hours += record.hours_per_week;
        self.duration += record.course_duration_weeks;
        self.completion += record.completion_percent;
        self.satisfaction += record.satisfaction_score;
    }

    fn into_stats(self) -> CourseStats {
        if self.count == 0 {
            return CourseStats::empty();
        }
        let n = self.count as f64;
        CourseStats {
            record_count: self.count,
            avg_hours_per_week: self.hours / n,
            avg_course_duration: self.duration / n,
            avg_completion_percent: self.completion / n,
            avg_satisfaction_score: self.satisfaction / n,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter-and-aggregate
// ---------------------------------------------------------------------------

/// Return indices of records that pass `criteria`.
///
/// Selectors are not validated here; an out-of-range selector simply
/// matches nothing.
pub fn filtered_indices(store: &CourseStore, criteria: &FilterCriteria) -> Vec<usize> {
    store
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| criteria.matches(record))
        .map(|(i, _)| i)
        .collect()
}

/// Count the records matching `criteria` and average their numeric fields.
///
/// Fails with [`Error::InvalidFilter`](crate::Error::InvalidFilter) before
/// touching any record if a selector is out of range. An empty match is not
/// an error: it yields [`CourseStats::empty`].
///
/// Sums are plain `f64` additions in store order, so repeated calls on the
/// same store are bit-identical. Reordering the records leaves the count
/// unchanged, and leaves the averages bit-identical only while every partial
/// sum is exactly representable (e.g. integer-valued fields); otherwise
/// rounding may differ in the last bits.
pub fn calc_filtered_averages(
    store: &CourseStore,
    criteria: &FilterCriteria,
) -> Result<CourseStats> {
    criteria.validate(store.labels())?;

    let totals = store
        .records()
        .iter()
        .filter(|record| criteria.matches(record))
        .fold(Totals::default(), |mut acc, record| {
            acc.add(record);
            acc
        });

    log::debug!(
        "filter {:?} matched {} of {} records",
        criteria,
        totals.count,
        store.len()
    );

    Ok(totals.into_stats())
}

impl CourseStore {
    /// See [`calc_filtered_averages`].
    pub fn calc_filtered_averages(&self, criteria: &FilterCriteria) -> Result<CourseStats> {
        calc_filtered_averages(self, criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Selector;
    use crate::data::model::{Attribute, LabelSets};
    use crate::error::Error;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("L{i}")).collect()
    }

    fn rec(categories: [u8; 5], hours: f64, duration: f64, pct: f64, score: f64) -> CourseRecord {
        CourseRecord {
            id: None,
            categories,
            hours_per_week: hours,
            course_duration_weeks: duration,
            completion_percent: pct,
            satisfaction_score: score,
        }
    }

    /// Records A and B from the worked example; type has three labels so
    /// that `type=2` is valid but unmatched.
    fn example_store() -> CourseStore {
        CourseStore::new(
            LabelSets::new(labels(2), labels(3), labels(1), labels(1), labels(1)),
            vec![
                rec([1, 0, 0, 0, 0], 10.0, 8.0, 90.0, 4.0),
                rec([1, 1, 0, 0, 0], 20.0, 12.0, 70.0, 2.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn averages_over_both_records() {
        let store = example_store();
        let criteria = FilterCriteria::any().with(Attribute::ExperienceLevel, Selector::Index(1));
        let stats = store.calc_filtered_averages(&criteria).unwrap();
        assert_eq!(
            stats,
            CourseStats {
                record_count: 2,
                avg_hours_per_week: 15.0,
                avg_course_duration: 10.0,
                avg_completion_percent: 80.0,
                avg_satisfaction_score: 3.0,
            }
        );
    }

    #[test]
    fn single_match_returns_raw_values() {
        let store = example_store();
        let criteria = FilterCriteria::any()
            .with(Attribute::ExperienceLevel, Selector::Index(1))
            .with(Attribute::CourseType, Selector::Index(0));
        let stats = store.calc_filtered_averages(&criteria).unwrap();
        assert_eq!(stats.record_count, 1);
        assert_eq!(stats.avg_hours_per_week, 10.0);
        assert_eq!(stats.avg_course_duration, 8.0);
        assert_eq!(stats.avg_completion_percent, 90.0);
        assert_eq!(stats.avg_satisfaction_score, 4.0);
    }

    #[test]
    fn empty_match_uses_sentinel() {
        let store = example_store();
        let criteria = FilterCriteria::any().with(Attribute::CourseType, Selector::Index(2));
        let stats = store.calc_filtered_averages(&criteria).unwrap();
        assert!(stats.is_empty());
        assert_eq!(stats, CourseStats::empty());
        assert_eq!(stats.avg_satisfaction_score, -1.0);
    }

    #[test]
    fn invalid_selector_is_rejected() {
        let store = example_store();
        let criteria = FilterCriteria::any().with(Attribute::CourseType, Selector::Index(3));
        assert_eq!(
            store.calc_filtered_averages(&criteria).unwrap_err(),
            Error::InvalidFilter {
                attribute: Attribute::CourseType,
                index: 3,
                size: 3,
            }
        );
    }

    #[test]
    fn empty_store_yields_sentinel() {
        let store = CourseStore::new(LabelSets::default(), Vec::new()).unwrap();
        let stats = store.calc_filtered_averages(&FilterCriteria::any()).unwrap();
        assert_eq!(stats, CourseStats::empty());
    }

    #[test]
    fn filtered_indices_follow_store_order() {
        let store = example_store();
        assert_eq!(filtered_indices(&store, &FilterCriteria::any()), vec![0, 1]);
        let criteria = FilterCriteria::any().with(Attribute::CourseType, Selector::Index(1));
        assert_eq!(filtered_indices(&store, &criteria), vec![1]);
    }
}
