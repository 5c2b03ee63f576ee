use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Position of a label inside its attribute's label set.
pub type LabelIndex = u8;

/// Largest label set a single attribute may carry.
pub const MAX_LABELS: usize = LabelIndex::MAX as usize + 1;

// ---------------------------------------------------------------------------
// Attribute – the five categorical columns
// ---------------------------------------------------------------------------

/// One of the five categorical attributes of a course record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    ExperienceLevel,
    CourseType,
    Platform,
    CompletionStatus,
    DropoutReason,
}

impl Attribute {
    /// All attributes in declaration order.
    pub const ALL: [Attribute; 5] = [
        Attribute::ExperienceLevel,
        Attribute::CourseType,
        Attribute::Platform,
        Attribute::CompletionStatus,
        Attribute::DropoutReason,
    ];

    /// Slot of this attribute in per-attribute arrays.
    pub const fn slot(self) -> usize {
        match self {
            Attribute::ExperienceLevel => 0,
            Attribute::CourseType => 1,
            Attribute::Platform => 2,
            Attribute::CompletionStatus => 3,
            Attribute::DropoutReason => 4,
        }
    }

    /// Kebab-case name, as accepted on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Attribute::ExperienceLevel => "experience-level",
            Attribute::CourseType => "course-type",
            Attribute::Platform => "platform",
            Attribute::CompletionStatus => "completion-status",
            Attribute::DropoutReason => "dropout-reason",
        }
    }

    /// Human-readable caption used by the presentation layer.
    pub const fn caption(self) -> &'static str {
        match self {
            Attribute::ExperienceLevel => "Experience Level",
            Attribute::CourseType => "Course Type",
            Attribute::Platform => "Platform",
            Attribute::CompletionStatus => "Completion Status",
            Attribute::DropoutReason => "Dropout Reason",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Attribute::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Attribute::ALL.iter().map(|a| a.name()).collect();
                format!("unknown attribute '{s}', expected one of: {}", names.join(", "))
            })
    }
}

// ---------------------------------------------------------------------------
// CourseRecord – one enrollment row
// ---------------------------------------------------------------------------

/// A single enrollment entry.
///
/// Categorical values are stored as indices into the owning store's
/// [`LabelSets`]; the numeric values are kept as read.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseRecord {
    /// Identity token (e.g. `U0500`), display only.
    pub id: Option<String>,
    /// Label index per attribute, indexed by [`Attribute::slot`].
    pub categories: [LabelIndex; 5],
    pub hours_per_week: f64,
    pub course_duration_weeks: f64,
    /// 0–100.
    pub completion_percent: f64,
    pub satisfaction_score: f64,
}

impl CourseRecord {
    /// Label index held for `attribute`.
    pub fn category(&self, attribute: Attribute) -> LabelIndex {
        self.categories[attribute.slot()]
    }
}

// ---------------------------------------------------------------------------
// LabelSets – ordered options per attribute
// ---------------------------------------------------------------------------

/// Ordered, human-readable options for every categorical attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSets {
    sets: [Vec<String>; 5],
}

impl LabelSets {
    pub fn new(
        experience_level: Vec<String>,
        course_type: Vec<String>,
        platform: Vec<String>,
        completion_status: Vec<String>,
        dropout_reason: Vec<String>,
    ) -> Self {
        Self {
            sets: [
                experience_level,
                course_type,
                platform,
                completion_status,
                dropout_reason,
            ],
        }
    }

    /// Options for `attribute` in load-time order.
    pub fn options(&self, attribute: Attribute) -> &[String] {
        &self.sets[attribute.slot()]
    }

    /// Number of options for `attribute`.
    pub fn len(&self, attribute: Attribute) -> usize {
        self.sets[attribute.slot()].len()
    }

    pub fn label(&self, attribute: Attribute, index: LabelIndex) -> Option<&str> {
        self.sets[attribute.slot()]
            .get(usize::from(index))
            .map(String::as_str)
    }

    pub fn index_of(&self, attribute: Attribute, label: &str) -> Option<LabelIndex> {
        self.sets[attribute.slot()]
            .iter()
            .position(|l| l == label)
            .and_then(|i| LabelIndex::try_from(i).ok())
    }
}

// ---------------------------------------------------------------------------
// CourseStore – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Immutable collection of course records plus their label sets.
#[derive(Debug, Clone)]
pub struct CourseStore {
    records: Vec<CourseRecord>,
    labels: LabelSets,
}

impl CourseStore {
    /// Assemble a store, rejecting any record whose categorical index falls
    /// outside its attribute's label set.
    pub fn new(labels: LabelSets, records: Vec<CourseRecord>) -> Result<Self> {
        for (pos, record) in records.iter().enumerate() {
            for attribute in Attribute::ALL {
                let index = record.category(attribute);
                let size = labels.len(attribute);
                if usize::from(index) >= size {
                    return Err(Error::LabelOutOfRange {
                        record: pos,
                        attribute,
                        index,
                        size,
                    });
                }
            }
        }
        Ok(Self { records, labels })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`, or [`Error::OutOfRange`].
    pub fn record_at(&self, index: usize) -> Result<&CourseRecord> {
        self.records.get(index).ok_or(Error::OutOfRange {
            index,
            size: self.records.len(),
        })
    }

    pub fn records(&self) -> &[CourseRecord] {
        &self.records
    }

    pub fn labels(&self) -> &LabelSets {
        &self.labels
    }

    /// Label set for `attribute`, without any "no filter" entry.
    pub fn label_options(&self, attribute: Attribute) -> &[String] {
        self.labels.options(attribute)
    }

    /// Render a record on one line with every categorical index resolved to
    /// its label, in source column order:
    ///
    /// `[U0500, Working Professional, Non-Tech, Coursera, 6, 22, In Progress, 85, No Dropout, 5]`
    pub fn record_display_string(&self, record: &CourseRecord) -> String {
        let label = |attribute: Attribute| {
            self.labels
                .label(attribute, record.category(attribute))
                .unwrap_or("<unknown>")
        };

        let mut fields: Vec<String> = Vec::with_capacity(10);
        if let Some(id) = &record.id {
            fields.push(id.clone());
        }
        fields.push(label(Attribute::ExperienceLevel).to_string());
        fields.push(label(Attribute::CourseType).to_string());
        fields.push(label(Attribute::Platform).to_string());
        fields.push(record.hours_per_week.to_string());
        fields.push(record.course_duration_weeks.to_string());
        fields.push(label(Attribute::CompletionStatus).to_string());
        fields.push(record.completion_percent.to_string());
        fields.push(label(Attribute::DropoutReason).to_string());
        fields.push(record.satisfaction_score.to_string());

        format!("[{}]", fields.join(", "))
    }
}
