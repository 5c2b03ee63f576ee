use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{Attribute, CourseRecord, CourseStore, LabelIndex, LabelSets, MAX_LABELS};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Loader settings. Every field has a default, so a partial JSON file is fine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Lowest accepted satisfaction score (inclusive).
    pub satisfaction_min: f64,
    /// Highest accepted satisfaction score (inclusive).
    pub satisfaction_max: f64,
    /// Reject rows without a `UserID`.
    pub require_id: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            satisfaction_min: 1.0,
            satisfaction_max: 10.0,
            require_id: false,
        }
    }
}

impl LoadOptions {
    /// Read options from a JSON object such as `{"satisfaction_max": 5}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading options file {}", path.display()))?;
        let options: Self = serde_json::from_str(&text).context("parsing options JSON")?;
        if options.satisfaction_min > options.satisfaction_max {
            bail!(
                "satisfaction_min ({}) is greater than satisfaction_max ({})",
                options.satisfaction_min,
                options.satisfaction_max
            );
        }
        Ok(options)
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a course dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one record per line
/// * `.json`    – `[{ "UserID": "U0001", "ExperienceLevel": "Student", ... }, ...]`
/// * `.parquet` – one column per field, string or numeric
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<CourseStore> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let store = match ext.as_str() {
        "csv" => load_csv(path, options),
        "json" => load_json(path, options),
        "parquet" | "pq" => load_parquet(path, options),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} course records from {} ({})",
        store.len(),
        path.display(),
        Attribute::ALL
            .iter()
            .map(|a| format!("{a}: {}", store.label_options(*a).len()))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(store)
}

// ---------------------------------------------------------------------------
// Column layout shared by all formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    UserId,
    ExperienceLevel,
    CourseType,
    Platform,
    HoursPerWeek,
    CourseDurationWeeks,
    CompletionStatus,
    CompletionPercent,
    DropoutReason,
    SatisfactionScore,
}

impl Column {
    const ALL: [Column; 10] = [
        Column::UserId,
        Column::ExperienceLevel,
        Column::CourseType,
        Column::Platform,
        Column::HoursPerWeek,
        Column::CourseDurationWeeks,
        Column::CompletionStatus,
        Column::CompletionPercent,
        Column::DropoutReason,
        Column::SatisfactionScore,
    ];

    const NUMERIC: [Column; 4] = [
        Column::HoursPerWeek,
        Column::CourseDurationWeeks,
        Column::CompletionPercent,
        Column::SatisfactionScore,
    ];

    fn header(self) -> &'static str {
        match self {
            Column::UserId => "UserID",
            Column::ExperienceLevel => "ExperienceLevel",
            Column::CourseType => "CourseType",
            Column::Platform => "Platform",
            Column::HoursPerWeek => "HoursPerWeek",
            Column::CourseDurationWeeks => "CourseDurationWeeks",
            Column::CompletionStatus => "CompletionStatus",
            Column::CompletionPercent => "CompletionPercent",
            Column::DropoutReason => "DropoutReason",
            Column::SatisfactionScore => "SatisfactionScore",
        }
    }

    fn attribute(self) -> Option<Attribute> {
        match self {
            Column::ExperienceLevel => Some(Attribute::ExperienceLevel),
            Column::CourseType => Some(Attribute::CourseType),
            Column::Platform => Some(Attribute::Platform),
            Column::CompletionStatus => Some(Attribute::CompletionStatus),
            Column::DropoutReason => Some(Attribute::DropoutReason),
            _ => None,
        }
    }

    fn matches(self, name: &str) -> bool {
        normalize(name) == normalize(self.header())
    }

    fn find<'a, I>(self, names: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().position(|n| self.matches(n))
    }

    fn is_required(self) -> bool {
        self != Column::UserId
    }
}

/// `Course_Duration Weeks` and `courseDurationWeeks` name the same column.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Position of every known column in a file's header, keyed by [`Column`].
struct ColumnMap([Option<usize>; 10]);

impl ColumnMap {
    fn resolve<'a, I>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        let mut positions = [None; 10];
        for (slot, column) in Column::ALL.into_iter().enumerate() {
            positions[slot] = column.find(names.clone());
            if positions[slot].is_none() && column.is_required() {
                bail!("missing '{}' column", column.header());
            }
        }
        Ok(Self(positions))
    }

    fn get(&self, column: Column) -> Option<usize> {
        let slot = Column::ALL.iter().position(|c| *c == column)?;
        self.0[slot]
    }
}

// ---------------------------------------------------------------------------
// Record assembly: label interning and numeric validation
// ---------------------------------------------------------------------------

/// One row as read from the file, before label interning.
#[derive(Debug, Default)]
struct RawRecord {
    id: Option<String>,
    labels: [String; 5],
    numbers: [f64; 4],
}

impl RawRecord {
    fn set_label(&mut self, column: Column, value: String) {
        if let Some(attribute) = column.attribute() {
            self.labels[attribute.slot()] = value;
        }
    }

    fn set_number(&mut self, column: Column, value: f64) {
        if let Some(slot) = Column::NUMERIC.iter().position(|c| *c == column) {
            self.numbers[slot] = value;
        }
    }
}

/// Interns labels in first-appearance order and collects validated records.
/// Row numbers passed in are 1-based data rows (the CSV header is not counted).
struct DatasetBuilder<'o> {
    options: &'o LoadOptions,
    labels: [Vec<String>; 5],
    lookup: [HashMap<String, LabelIndex>; 5],
    records: Vec<CourseRecord>,
}

impl<'o> DatasetBuilder<'o> {
    fn new(options: &'o LoadOptions) -> Self {
        Self {
            options,
            labels: Default::default(),
            lookup: Default::default(),
            records: Vec::new(),
        }
    }

    fn intern(&mut self, row: usize, attribute: Attribute, label: &str) -> Result<LabelIndex> {
        let slot = attribute.slot();
        let label = label.trim();
        if label.is_empty() {
            bail!("row {row}: empty {attribute} value");
        }
        if let Some(&index) = self.lookup[slot].get(label) {
            return Ok(index);
        }
        if self.labels[slot].len() >= MAX_LABELS {
            bail!("row {row}: {attribute} has more than {MAX_LABELS} distinct labels");
        }
        let index = LabelIndex::try_from(self.labels[slot].len())
            .with_context(|| format!("row {row}: {attribute} label index overflow"))?;
        self.labels[slot].push(label.to_string());
        self.lookup[slot].insert(label.to_string(), index);
        Ok(index)
    }

    fn push(&mut self, row: usize, raw: RawRecord) -> Result<()> {
        let id = raw
            .id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if id.is_none() && self.options.require_id {
            bail!("row {row}: missing UserID");
        }

        let mut categories = [0; 5];
        for attribute in Attribute::ALL {
            categories[attribute.slot()] =
                self.intern(row, attribute, &raw.labels[attribute.slot()])?;
        }

        let [hours, duration, pct, score] = raw.numbers;
        for (column, value) in Column::NUMERIC.iter().zip(raw.numbers) {
            if !value.is_finite() {
                bail!("row {row}: {} is not a finite number", column.header());
            }
        }
        if hours < 0.0 {
            bail!("row {row}: HoursPerWeek must not be negative, got {hours}");
        }
        if duration < 0.0 {
            bail!("row {row}: CourseDurationWeeks must not be negative, got {duration}");
        }
        if !(0.0..=100.0).contains(&pct) {
            bail!("row {row}: CompletionPercent must be within 0..=100, got {pct}");
        }
        let (lo, hi) = (self.options.satisfaction_min, self.options.satisfaction_max);
        if !(lo..=hi).contains(&score) {
            bail!("row {row}: SatisfactionScore must be within {lo}..={hi}, got {score}");
        }

        self.records.push(CourseRecord {
            id,
            categories,
            hours_per_week: hours,
            course_duration_weeks: duration,
            completion_percent: pct,
            satisfaction_score: score,
        });
        Ok(())
    }

    fn finish(self) -> Result<CourseStore> {
        let [experience, course_type, platform, completion, dropout] = self.labels;
        let labels = LabelSets::new(experience, course_type, platform, completion, dropout);
        Ok(CourseStore::new(labels, self.records)?)
    }
}

fn parse_number(s: &str, row: usize, column: Column) -> Result<f64> {
    let tok = s.trim();
    tok.parse::<f64>()
        .with_context(|| format!("row {row}, {}: '{tok}' is not a number", column.header()))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one course record per line.
/// `UserID` may be absent; all other columns are required.
fn load_csv(path: &Path, options: &LoadOptions) -> Result<CourseStore> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let columns = ColumnMap::resolve(headers.iter().map(String::as_str))?;

    let mut builder = DatasetBuilder::new(options);

    for (i, result) in reader.records().enumerate() {
        let row_no = i + 1;
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let mut raw = RawRecord::default();

        for column in Column::ALL {
            let Some(idx) = columns.get(column) else {
                continue;
            };
            let cell = record.get(idx).unwrap_or("");
            match column {
                Column::UserId => raw.id = Some(cell.to_string()),
                c if c.attribute().is_some() => raw.set_label(c, cell.to_string()),
                c => raw.set_number(c, parse_number(cell, row_no, c)?),
            }
        }

        builder.push(row_no, raw)?;
    }

    builder.finish()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   {
///     "UserID": "U0001",
///     "ExperienceLevel": "Student",
///     "HoursPerWeek": 6,
///     ...
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path, options: &LoadOptions) -> Result<CourseStore> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut builder = DatasetBuilder::new(options);

    for (pos, row) in rows.iter().enumerate() {
        let i = pos + 1;
        let obj = row
            .as_object()
            .with_context(|| format!("row {i} is not a JSON object"))?;

        let mut raw = RawRecord::default();
        for column in Column::ALL {
            let value = obj
                .iter()
                .find(|(key, _)| column.matches(key))
                .map(|(_, v)| v)
                .filter(|v| !v.is_null());

            let Some(value) = value else {
                if column.is_required() {
                    bail!("row {i}: missing '{}'", column.header());
                }
                continue;
            };

            match column {
                Column::UserId => raw.id = Some(json_to_text(value)),
                c if c.attribute().is_some() => match value {
                    JsonValue::String(s) => raw.set_label(c, s.clone()),
                    other => bail!("row {i}, {}: expected a string, got {other}", c.header()),
                },
                c => raw.set_number(c, json_to_number(value, i, c)?),
            }
        }

        builder.push(i, raw)?;
    }

    builder.finish()
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_to_number(val: &JsonValue, row: usize, column: Column) -> Result<f64> {
    match val {
        JsonValue::Number(n) => n
            .as_f64()
            .with_context(|| format!("row {row}, {}: {n} is not representable", column.header())),
        JsonValue::String(s) => parse_number(s, row, column),
        other => bail!("row {row}, {}: expected a number, got {other}", column.header()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of course records.
///
/// Expected schema: one column per field. Identity and categorical columns
/// are `Utf8`/`LargeUtf8`; numeric columns may be `Int32`, `Int64`,
/// `Float32` or `Float64`.
fn load_parquet(path: &Path, options: &LoadOptions) -> Result<CourseStore> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    // Checked against the file schema so that a file with no rows is still
    // rejected when columns are missing.
    let columns = {
        let schema = builder.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        ColumnMap::resolve(names.iter().copied())?
    };
    let reader = builder.build().context("building parquet reader")?;

    let mut dataset = DatasetBuilder::new(options);
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        for row in 0..batch.num_rows() {
            let row_no = row_offset + row + 1;
            let mut raw = RawRecord::default();

            for column in Column::ALL {
                let Some(idx) = columns.get(column) else {
                    continue;
                };
                let array = batch.column(idx);
                match column {
                    Column::UserId => raw.id = extract_text(array, row)?,
                    c if c.attribute().is_some() => {
                        let text = extract_text(array, row)?
                            .with_context(|| format!("row {row_no}: null {}", c.header()))?;
                        raw.set_label(c, text);
                    }
                    c => {
                        let value = extract_number(array, row)
                            .with_context(|| format!("row {row_no}, {}", c.header()))?;
                        raw.set_number(c, value);
                    }
                }
            }

            dataset.push(row_no, raw)?;
        }
        row_offset += batch.num_rows();
    }

    dataset.finish()
}

// -- Parquet / Arrow helpers --

/// Extract a string cell; `None` for null.
fn extract_text(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let text = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        other => bail!("expected a string column, got {other:?}"),
    };
    Ok(Some(text))
}

/// Extract a numeric cell as `f64`.
fn extract_number(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| f64::from(a.value(row))),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| f64::from(a.value(row))),
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        other => bail!("expected a numeric column, got {other:?}"),
    };
    value.context("column type does not match its array")
}
