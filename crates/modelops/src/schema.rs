use serde::{Deserialize, Serialize};

pub const STATUS_STARTING: &str = "starting";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_ERROR: &str = "error";

/// Status label the daemon uses for the last line of a finished pull.
pub const UPSTREAM_SUCCESS: &str = "success";

/// Latest known state of one model's pull.
///
/// Records are replaced wholesale on every update, never merged, so every
/// field reflects the same upstream line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressRecord {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    pub percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressRecord {
    pub fn starting() -> Self {
        Self {
            status: STATUS_STARTING.to_string(),
            completed: None,
            total: None,
            digest: None,
            percent: 0.0,
            success: None,
            error: None,
        }
    }

    /// Builds the record for one upstream progress line. The percentage is
    /// always derived from this line's byte counts.
    pub fn from_line(line: &PullLine) -> Self {
        let completed = line.completed.unwrap_or(0);
        let total = line.total.unwrap_or(0);
        Self {
            status: line.status.clone().unwrap_or_else(|| "unknown".to_string()),
            completed: Some(completed),
            total: Some(total),
            digest: Some(line.digest.clone().unwrap_or_default()),
            percent: percent_of(completed, total),
            success: None,
            error: None,
        }
    }

    pub fn completed() -> Self {
        Self {
            status: STATUS_COMPLETED.to_string(),
            completed: None,
            total: None,
            digest: None,
            percent: 100.0,
            success: Some(true),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            completed: None,
            total: None,
            digest: None,
            percent: 0.0,
            success: Some(false),
            error: Some(error.into()),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }
}

/// One newline-delimited progress object from the daemon's pull stream.
/// Every field is optional; the daemon omits byte counts outside the
/// download phase.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PullLine {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub completed: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub digest: Option<String>,
}

impl PullLine {
    /// Decodes one raw line. `None` means the line is not a progress
    /// object and should be skipped.
    pub fn decode(raw: &[u8]) -> Option<Self> {
        serde_json::from_slice(raw).ok()
    }

    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(UPSTREAM_SUCCESS)
    }
}

/// Completion percentage with one decimal place; 0 when the total is unknown.
pub fn percent_of(completed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = completed as f64 / total as f64 * 100.0;
    // Decimal formatting rounds the exact binary value, ties to even.
    format!("{pct:.1}").parse().unwrap_or(pct)
}
