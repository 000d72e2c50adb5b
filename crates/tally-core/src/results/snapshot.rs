use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Count for one choice as carried by a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceTally {
    pub choice_id: String,
    pub count: u64,
    /// Label sent by the server, if any. The catalog label wins for display.
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireTally {
    count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

/// Complete replacement of the aggregate counts, keyed by choice id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "BTreeMap<String, WireTally>", into = "BTreeMap<String, WireTally>")]
pub struct ResultsSnapshot {
    tallies: BTreeMap<String, ChoiceTally>,
}

impl From<BTreeMap<String, WireTally>> for ResultsSnapshot {
    fn from(wire: BTreeMap<String, WireTally>) -> Self {
        let tallies = wire
            .into_iter()
            .map(|(choice_id, w)| {
                let tally = ChoiceTally {
                    choice_id: choice_id.clone(),
                    count: w.count,
                    label: w.label,
                };
                (choice_id, tally)
            })
            .collect();
        ResultsSnapshot { tallies }
    }
}

impl From<ResultsSnapshot> for BTreeMap<String, WireTally> {
    fn from(snapshot: ResultsSnapshot) -> Self {
        snapshot
            .tallies
            .into_iter()
            .map(|(id, t)| {
                (
                    id,
                    WireTally {
                        count: t.count,
                        label: t.label,
                    },
                )
            })
            .collect()
    }
}

impl ResultsSnapshot {
    pub fn parse(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_counts<'a>(counts: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        let tallies = counts
            .into_iter()
            .map(|(id, count)| {
                (
                    id.to_string(),
                    ChoiceTally {
                        choice_id: id.to_string(),
                        count,
                        label: None,
                    },
                )
            })
            .collect();
        ResultsSnapshot { tallies }
    }

    pub fn count(&self, choice_id: &str) -> u64 {
        self.tallies.get(choice_id).map(|t| t.count).unwrap_or(0)
    }

    pub fn get(&self, choice_id: &str) -> Option<&ChoiceTally> {
        self.tallies.get(choice_id)
    }

    pub fn tallies(&self) -> impl Iterator<Item = &ChoiceTally> {
        self.tallies.values()
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }
}
