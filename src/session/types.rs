use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::roster::types::Roster;

/// A mirror of the roster written after every successful mutating command.
/// If the primary roster file is later found corrupt, the CLI offers to
/// recover from this snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Autosave {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub roster: Roster,
}

impl Autosave {
    pub fn new(roster: Roster) -> Self {
        Self {
            version: 1,
            saved_at: Utc::now(),
            roster,
        }
    }

    /// Format the snapshot's age in human-friendly form for the recovery
    /// prompt: "3h old", "2d old", "just now"
    pub fn age_label(&self) -> String {
        let age = Utc::now() - self.saved_at;
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();
        let weeks = days / 7;

        if weeks >= 1 {
            format!("{}w old", weeks)
        } else if days >= 1 {
            format!("{}d old", days)
        } else if hours >= 1 {
            format!("{}h old", hours)
        } else if minutes >= 1 {
            format!("{}m old", minutes)
        } else {
            "just now".to_string()
        }
    }
}
