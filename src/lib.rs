//! Filter online-course enrollment records by their categorical attributes
//! and summarise the matching subset.
//!
//! ```no_run
//! use course_lens::{Attribute, FilterCriteria, LoadOptions, Selector, load_file};
//!
//! let store = load_file("courses.csv".as_ref(), &LoadOptions::default())?;
//! let criteria = FilterCriteria::any().with(Attribute::Platform, Selector::Index(0));
//! let stats = store.calc_filtered_averages(&criteria)?;
//! println!("{} records, {:.2} h/week", stats.record_count, stats.avg_hours_per_week);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod data;
pub mod error;
pub mod presentation;

pub use data::filter::{FilterCriteria, Selector};
pub use data::loader::{LoadOptions, load_file};
pub use data::model::{Attribute, CourseRecord, CourseStore, LabelIndex, LabelSets};
pub use data::stats::{CourseStats, NO_DATA, calc_filtered_averages, filtered_indices};
pub use error::{Error, Result};
