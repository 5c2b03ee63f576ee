//! Property tests for the filter-and-aggregate engine
//!
//! - Brute-force recount agrees with the engine
//! - All-unset criteria cover the whole store
//! - Repeated calls are bit-identical
//! - Reordering the records does not change the result
//! - Empty matches yield the -1.0 sentinel
//! - One-past-end selectors are rejected

use course_lens::{
    Attribute, CourseRecord, CourseStats, CourseStore, Error, FilterCriteria, LabelSets, Selector,
    filtered_indices,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Label-set sizes per attribute (1..=4 options each).
fn arb_sizes() -> impl Strategy<Value = [usize; 5]> {
    [1usize..=4, 1usize..=4, 1usize..=4, 1usize..=4, 1usize..=4]
}

fn arb_record(sizes: [usize; 5]) -> impl Strategy<Value = CourseRecord> {
    (
        [
            0..sizes[0] as u8,
            0..sizes[1] as u8,
            0..sizes[2] as u8,
            0..sizes[3] as u8,
            0..sizes[4] as u8,
        ],
        0u32..=40,
        0u32..=52,
        0u32..=100,
        1u32..=5,
    )
        .prop_map(|(categories, hours, duration, pct, score)| CourseRecord {
            id: None,
            categories,
            hours_per_week: f64::from(hours),
            course_duration_weeks: f64::from(duration),
            completion_percent: f64::from(pct),
            satisfaction_score: f64::from(score),
        })
}

fn labels_for(sizes: [usize; 5]) -> LabelSets {
    let names = |attr: usize| (0..sizes[attr]).map(|i| format!("opt{i}")).collect();
    LabelSets::new(names(0), names(1), names(2), names(3), names(4))
}

fn arb_store() -> impl Strategy<Value = CourseStore> {
    arb_sizes().prop_flat_map(|sizes| {
        proptest::collection::vec(arb_record(sizes), 0..60)
            .prop_map(move |records| CourseStore::new(labels_for(sizes), records).unwrap())
    })
}

fn arb_selector(size: usize) -> impl Strategy<Value = Selector> {
    prop_oneof![Just(Selector::Unset), (0..size as u8).prop_map(Selector::Index)]
}

/// The same records in two orders, plus valid criteria for both.
fn arb_reordered_stores() -> impl Strategy<Value = (CourseStore, CourseStore, FilterCriteria)> {
    arb_sizes().prop_flat_map(|sizes| {
        proptest::collection::vec(arb_record(sizes), 0..60).prop_flat_map(move |records| {
            let criteria = (
                arb_selector(sizes[0]),
                arb_selector(sizes[1]),
                arb_selector(sizes[2]),
                arb_selector(sizes[3]),
                arb_selector(sizes[4]),
            )
                .prop_map(|(a, b, c, d, e)| FilterCriteria::new(a, b, c, d, e));
            (Just(records.clone()), Just(records).prop_shuffle(), criteria).prop_map(
                move |(original, shuffled, criteria)| {
                    (
                        CourseStore::new(labels_for(sizes), original).unwrap(),
                        CourseStore::new(labels_for(sizes), shuffled).unwrap(),
                        criteria,
                    )
                },
            )
        })
    })
}

/// Store plus criteria whose selectors are all valid for it.
fn arb_store_and_criteria() -> impl Strategy<Value = (CourseStore, FilterCriteria)> {
    arb_store().prop_flat_map(|store| {
        let selector = |attr: Attribute| arb_selector(store.label_options(attr).len());
        let selectors = (
            selector(Attribute::ExperienceLevel),
            selector(Attribute::CourseType),
            selector(Attribute::Platform),
            selector(Attribute::CompletionStatus),
            selector(Attribute::DropoutReason),
        );
        (Just(store), selectors).prop_map(|(store, (a, b, c, d, e))| {
            (store, FilterCriteria::new(a, b, c, d, e))
        })
    })
}

/// Bit patterns of the four averages.
fn average_bits(stats: &CourseStats) -> [u64; 4] {
    [
        stats.avg_hours_per_week.to_bits(),
        stats.avg_course_duration.to_bits(),
        stats.avg_completion_percent.to_bits(),
        stats.avg_satisfaction_score.to_bits(),
    ]
}

fn brute_force_count(store: &CourseStore, criteria: &FilterCriteria) -> usize {
    store
        .records()
        .iter()
        .filter(|r| {
            Attribute::ALL.iter().all(|a| match criteria.get(*a) {
                Selector::Unset => true,
                Selector::Index(i) => r.category(*a) == i,
            })
        })
        .count()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: no filter counts every record
    #[test]
    fn prop_unset_counts_whole_store(store in arb_store()) {
        let stats = store.calc_filtered_averages(&FilterCriteria::any()).unwrap();
        prop_assert_eq!(stats.record_count, store.len());
    }

    /// Property: count matches an independent recount
    #[test]
    fn prop_count_matches_brute_force((store, criteria) in arb_store_and_criteria()) {
        let stats = store.calc_filtered_averages(&criteria).unwrap();
        prop_assert_eq!(stats.record_count, brute_force_count(&store, &criteria));
        prop_assert_eq!(filtered_indices(&store, &criteria).len(), stats.record_count);
    }

    /// Property: averages equal sum / n over matching records
    #[test]
    fn prop_averages_are_means((store, criteria) in arb_store_and_criteria()) {
        let stats = store.calc_filtered_averages(&criteria).unwrap();
        let matched: Vec<&CourseRecord> = filtered_indices(&store, &criteria)
            .into_iter()
            .map(|i| store.record_at(i).unwrap())
            .collect();

        if matched.is_empty() {
            prop_assert_eq!(stats, CourseStats::empty());
        } else {
            let n = matched.len() as f64;
            let hours: f64 = matched.iter().map(|r| r.hours_per_week).sum();
            let pct: f64 = matched.iter().map(|r| r.completion_percent).sum();
            prop_assert_eq!(stats.avg_hours_per_week, hours / n);
            prop_assert_eq!(stats.avg_completion_percent, pct / n);
            prop_assert!(stats.avg_satisfaction_score >= 1.0);
            prop_assert!(stats.avg_satisfaction_score <= 5.0);
        }
    }

    /// Property: identical inputs give bit-identical results
    #[test]
    fn prop_idempotent((store, criteria) in arb_store_and_criteria()) {
        let first = store.calc_filtered_averages(&criteria).unwrap();
        let second = store.calc_filtered_averages(&criteria).unwrap();
        prop_assert_eq!(first.record_count, second.record_count);
        prop_assert_eq!(average_bits(&first), average_bits(&second));
    }

    /// Property: scan order does not change the result
    ///
    /// Field values are whole numbers, so every partial sum is exact and the
    /// averages must agree bit for bit.
    #[test]
    fn prop_independent_of_record_order(
        (original, shuffled, criteria) in arb_reordered_stores()
    ) {
        let a = original.calc_filtered_averages(&criteria).unwrap();
        let b = shuffled.calc_filtered_averages(&criteria).unwrap();
        prop_assert_eq!(a.record_count, b.record_count);
        prop_assert_eq!(average_bits(&a), average_bits(&b));
    }

    /// Property: a selector equal to the label-set size is rejected
    #[test]
    fn prop_one_past_end_rejected(store in arb_store(), slot in 0usize..5) {
        let attribute = Attribute::ALL[slot];
        let size = store.label_options(attribute).len();
        let criteria = FilterCriteria::any().with(attribute, Selector::Index(size as u8));
        prop_assert_eq!(
            store.calc_filtered_averages(&criteria),
            Err(Error::InvalidFilter { attribute, index: size, size })
        );
    }
}
