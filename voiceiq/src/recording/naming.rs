use chrono::{DateTime, Utc};

pub const DEFAULT_LABEL: &str = "recording";

/// Generates numbered file names for saved recordings.
///
/// The counter lives only as long as the namer.
#[derive(Debug, Default)]
pub struct RecordingNamer {
    count: u32,
}

impl RecordingNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter value (the number used by the last generated name)
    pub fn count(&self) -> u32 {
        self.count
    }

    /// `"{label}_{count}_{timestamp}.wav"`, label defaulting to `recording`
    pub fn next_file_name(&mut self, label: Option<&str>) -> String {
        self.next_file_name_at(label, Utc::now())
    }

    pub fn next_file_name_at(&mut self, label: Option<&str>, now: DateTime<Utc>) -> String {
        self.count += 1;
        format!(
            "{}_{}_{}.wav",
            label.unwrap_or(DEFAULT_LABEL),
            self.count,
            file_timestamp(now)
        )
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// ISO 8601 instant cut at seconds, with `:` replaced so it is safe in file names
fn file_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S").to_string()
}
