use crate::data::filter::{FilterCriteria, Selector};
use crate::data::model::{Attribute, CourseStore, LabelIndex};
use crate::data::stats::{CourseStats, filtered_indices};
use crate::error::{Error, Result};

/// Extra leading option shown in every selector; never reaches the engine.
pub const NO_FILTER_LABEL: &str = "(no filter)";

// ---------------------------------------------------------------------------
// Display-position translation
// ---------------------------------------------------------------------------

/// Options as offered to the user: the sentinel at position 0, then the
/// attribute's label set.
pub fn display_options(store: &CourseStore, attribute: Attribute) -> Vec<String> {
    std::iter::once(NO_FILTER_LABEL.to_string())
        .chain(store.label_options(attribute).iter().cloned())
        .collect()
}

/// Position 0 is the wildcard; position `k > 0` selects label `k - 1`.
/// Returns `None` for positions no label index can represent.
pub fn selector_for_position(position: usize) -> Option<Selector> {
    match position {
        0 => Some(Selector::Unset),
        k => LabelIndex::try_from(k - 1).ok().map(Selector::Index),
    }
}

/// Display position of `label`, counting the sentinel.
///
/// A real label wins over the sentinel text, so a dataset option spelled
/// `(no filter)` stays selectable.
pub fn position_for_label(store: &CourseStore, attribute: Attribute, label: &str) -> Option<usize> {
    match store.labels().index_of(attribute, label) {
        Some(i) => Some(usize::from(i) + 1),
        None if label == NO_FILTER_LABEL => Some(0),
        None => None,
    }
}

/// The five summary lines, formatted for display.
pub fn stat_lines(stats: &CourseStats) -> [String; 5] {
    [
        format!("Filtered record count:  {}", stats.record_count),
        format!("Average hours per week: {:.2}", stats.avg_hours_per_week),
        format!("Average course duration: {:.2}", stats.avg_course_duration),
        format!("Average completion percentage: {:.2}", stats.avg_completion_percent),
        format!("Average satisfaction rating: {:.2}", stats.avg_satisfaction_score),
    ]
}

// ---------------------------------------------------------------------------
// Filter panel state
// ---------------------------------------------------------------------------

/// Selection state of the filter panel, independent of rendering.
///
/// Every change to a selector re-runs the aggregation, so `stats` always
/// reflects the current positions.
pub struct FilterPanel {
    store: CourseStore,
    /// Display position per attribute, 0 = no filter.
    positions: [usize; 5],
    stats: CourseStats,
}

impl FilterPanel {
    /// Take ownership of a loaded store and compute the unfiltered summary.
    pub fn new(store: CourseStore) -> Result<Self> {
        let stats = store.calc_filtered_averages(&FilterCriteria::any())?;
        Ok(Self {
            store,
            positions: [0; 5],
            stats,
        })
    }

    pub fn store(&self) -> &CourseStore {
        &self.store
    }

    pub fn stats(&self) -> &CourseStats {
        &self.stats
    }

    pub fn position(&self, attribute: Attribute) -> usize {
        self.positions[attribute.slot()]
    }

    /// Translate the current display positions into engine criteria.
    pub fn criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria::any();
        for attribute in Attribute::ALL {
            let selector =
                selector_for_position(self.position(attribute)).unwrap_or(Selector::Unset);
            criteria.set(attribute, selector);
        }
        criteria
    }

    /// Choose display position `position` for `attribute` and re-filter.
    ///
    /// A position past the last option is rejected and leaves the panel
    /// unchanged.
    pub fn select(&mut self, attribute: Attribute, position: usize) -> Result<&CourseStats> {
        let size = self.store.label_options(attribute).len();
        if position > size || selector_for_position(position).is_none() {
            return Err(Error::InvalidFilter {
                attribute,
                index: position - 1,
                size,
            });
        }
        self.positions[attribute.slot()] = position;
        self.refilter()
    }

    /// Put every selector back on "no filter" and re-filter.
    pub fn reset(&mut self) -> Result<&CourseStats> {
        self.positions = [0; 5];
        self.refilter()
    }

    /// Recompute `stats` after a selector change.
    pub fn refilter(&mut self) -> Result<&CourseStats> {
        self.stats = self.store.calc_filtered_averages(&self.criteria())?;
        Ok(&self.stats)
    }

    /// Indices of records passing the current selection.
    pub fn matching_indices(&self) -> Vec<usize> {
        filtered_indices(&self.store, &self.criteria())
    }

    pub fn stat_lines(&self) -> [String; 5] {
        stat_lines(&self.stats)
    }
}
