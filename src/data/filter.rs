use super::model::{Attribute, CourseRecord, LabelIndex, LabelSets};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Selector: wildcard or one concrete label per attribute
// ---------------------------------------------------------------------------

/// Filter for a single attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Match any value.
    #[default]
    Unset,
    /// Match only this label index.
    Index(LabelIndex),
}

impl Selector {
    pub fn is_set(self) -> bool {
        matches!(self, Selector::Index(_))
    }

    /// Whether `value` passes this selector.
    pub fn accepts(self, value: LabelIndex) -> bool {
        match self {
            Selector::Unset => true,
            Selector::Index(wanted) => wanted == value,
        }
    }
}

impl From<Option<LabelIndex>> for Selector {
    fn from(value: Option<LabelIndex>) -> Self {
        value.map_or(Selector::Unset, Selector::Index)
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria: one selector per categorical attribute
// ---------------------------------------------------------------------------

/// Per-attribute selection state. The default leaves every attribute unset,
/// which matches the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FilterCriteria {
    selectors: [Selector; 5],
}

impl FilterCriteria {
    /// Criteria that match every record.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn new(
        experience_level: Selector,
        course_type: Selector,
        platform: Selector,
        completion_status: Selector,
        dropout_reason: Selector,
    ) -> Self {
        Self {
            selectors: [
                experience_level,
                course_type,
                platform,
                completion_status,
                dropout_reason,
            ],
        }
    }

    /// Builder-style: replace the selector for `attribute`.
    pub fn with(mut self, attribute: Attribute, selector: Selector) -> Self {
        self.set(attribute, selector);
        self
    }

    pub fn set(&mut self, attribute: Attribute, selector: Selector) {
        self.selectors[attribute.slot()] = selector;
    }

    pub fn get(&self, attribute: Attribute) -> Selector {
        self.selectors[attribute.slot()]
    }

    /// Attributes that currently constrain the result.
    pub fn active(&self) -> impl Iterator<Item = (Attribute, LabelIndex)> + '_ {
        Attribute::ALL.into_iter().filter_map(|a| match self.get(a) {
            Selector::Index(i) => Some((a, i)),
            Selector::Unset => None,
        })
    }

    /// Check every set selector against its attribute's label set.
    ///
    /// Out-of-range selectors are rejected, never clamped.
    pub fn validate(&self, labels: &LabelSets) -> Result<()> {
        for (attribute, index) in self.active() {
            let size = labels.len(attribute);
            if usize::from(index) >= size {
                return Err(Error::InvalidFilter {
                    attribute,
                    index: usize::from(index),
                    size,
                });
            }
        }
        Ok(())
    }

    /// A record matches when every set selector equals the record's value.
    pub fn matches(&self, record: &CourseRecord) -> bool {
        Attribute::ALL
            .into_iter()
            .all(|a| self.get(a).accepts(record.category(a)))
    }
}
