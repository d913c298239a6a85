//! Nudges: stale notes surfaced for revisiting.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::note::{Layer, Note};

/// Maximum number of notes returned per nudge request
pub const NUDGE_LIMIT: usize = 3;

/// How stale a note must be before it is nudged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NudgeFrequency {
    /// Not updated in the last day
    #[default]
    Daily,
    /// Not updated in the last week
    Weekly,
    /// Any note
    All,
}

impl NudgeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            NudgeFrequency::Daily => "daily",
            NudgeFrequency::Weekly => "weekly",
            NudgeFrequency::All => "all",
        }
    }

    /// Notes updated at or after `now - window` are considered fresh
    pub fn window(&self) -> Option<Duration> {
        match self {
            NudgeFrequency::Daily => Some(Duration::days(1)),
            NudgeFrequency::Weekly => Some(Duration::days(7)),
            NudgeFrequency::All => None,
        }
    }
}

impl std::fmt::Display for NudgeFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NudgeFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(NudgeFrequency::Daily),
            "weekly" => Ok(NudgeFrequency::Weekly),
            "all" => Ok(NudgeFrequency::All),
            other => Err(format!(
                "unknown frequency '{}': expected daily, weekly or all",
                other
            )),
        }
    }
}

/// Pick up to [`NUDGE_LIMIT`] notes, least recently updated first.
pub fn select_nudges(
    notes: Vec<Note>,
    layer: Option<Layer>,
    frequency: NudgeFrequency,
    now: DateTime<Utc>,
) -> Vec<Note> {
    let threshold = frequency.window().map(|w| now - w);

    let mut candidates: Vec<Note> = notes
        .into_iter()
        .filter(|n| layer.is_none() || n.layer == layer)
        .filter(|n| threshold.is_none_or(|t| n.updated_at < t))
        .collect();

    candidates.sort_by_key(|n| n.updated_at);
    candidates.truncate(NUDGE_LIMIT);
    candidates
}

// ============================================================================
// TESTS
// ============================================================================
