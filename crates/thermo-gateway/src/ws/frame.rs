//! Wire frames pushed to live subscribers.
//!
//! Clients are receive-only; the single frame shape is
//! `{"type": "data", "data": Snapshot}`, used both as the welcome
//! message and for every broadcast.

use crate::domain::model::Snapshot;
use serde::Serialize;

/// Outbound data frame carrying a full snapshot.
#[derive(Debug, Serialize)]
pub struct DataFrame<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: &'a Snapshot,
}

impl<'a> DataFrame<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            kind: "data",
            data: snapshot,
        }
    }

    /// Serialize once; the resulting text is shared across subscribers.
    pub fn to_text(&self) -> String {
        // Snapshot contains only JSON-safe values; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{\"type\":\"data\"}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Summary;

    #[test]
    fn test_frame_shape() {
        let snapshot = Snapshot {
            summary: Summary::empty(),
            list: vec![],
        };
        let text = DataFrame::new(&snapshot).to_text();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "data");
        assert_eq!(value["data"]["summary"]["count"], 0);
        assert_eq!(value["data"]["summary"]["average"], "0.00");
        assert!(value["data"]["list"].as_array().unwrap().is_empty());
    }
}
