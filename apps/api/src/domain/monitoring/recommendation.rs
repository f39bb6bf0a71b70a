use serde::{Deserialize, Serialize};

/// Declaration order is sort order: `High` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Index,
    Performance,
    Reliability,
}

/// Advisory produced by the recommendation rules. Never applied automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub message: String,
}

impl Recommendation {
    pub fn new(kind: RecommendationKind, priority: Priority, message: String) -> Self {
        Self {
            kind,
            priority,
            message,
        }
    }
}
