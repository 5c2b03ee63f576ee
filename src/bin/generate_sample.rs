use anyhow::{Context, Result};
use serde::Serialize;

/// Column names match what the loader expects.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Row<'a> {
    #[serde(rename = "UserID")]
    user_id: String,
    experience_level: &'a str,
    course_type: &'a str,
    platform: &'a str,
    hours_per_week: u32,
    course_duration_weeks: u32,
    completion_status: &'a str,
    completion_percent: u32,
    dropout_reason: &'a str,
    satisfaction_score: u32,
}

/// Minimal deterministic PRNG (splitmix64)
struct SimpleRng(u64);

impl SimpleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + (self.next_u64() % u64::from(hi - lo + 1)) as u32
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[self.range(0, options.len() as u32 - 1) as usize]
    }
}

const EXPERIENCE: [&str; 3] = ["Beginner", "Intermediate", "Working Professional"];
const COURSE_TYPE: [&str; 2] = ["Tech", "Non-Tech"];
const PLATFORM: [&str; 5] = ["Coursera", "Udemy", "edX", "YouTube", "Other"];
const DROPOUT: [&str; 4] = ["Lack of Time", "Lost Interest", "Too Difficult", "Financial"];

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng(42);
    let output_path = "sample_courses.csv";
    let mut writer = csv::Writer::from_path(output_path).context("creating output file")?;

    let count = 500;
    for n in 1..=count {
        let completion_percent = rng.range(0, 100);
        let (completion_status, dropout_reason) = match completion_percent {
            100 => ("Completed", "No Dropout"),
            p if p >= 40 => ("In Progress", "No Dropout"),
            _ => ("Dropped", rng.pick(&DROPOUT)),
        };

        writer
            .serialize(Row {
                user_id: format!("U{n:04}"),
                experience_level: rng.pick(&EXPERIENCE),
                course_type: rng.pick(&COURSE_TYPE),
                platform: rng.pick(&PLATFORM),
                hours_per_week: rng.range(1, 20),
                course_duration_weeks: rng.range(2, 24),
                completion_status,
                completion_percent,
                dropout_reason,
                satisfaction_score: rng.range(1, 5),
            })
            .with_context(|| format!("writing row {n}"))?;
    }
    writer.flush().context("flushing output file")?;

    log::info!("generated {count} records");
    println!("Wrote {count} course records to {output_path}");
    Ok(())
}
