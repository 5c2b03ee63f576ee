/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → CourseStore (labels interned)
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ CourseStore  │  Vec<CourseRecord>, LabelSets
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterCriteria → matching records
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  count + averages (CourseStats)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
pub mod stats;
