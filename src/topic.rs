//! The closed label set a chunk can be assigned to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label written to the `topic` column when a chunk could not be classified.
pub const ERROR_LABEL: &str = "Error";

/// One of the fixed news topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Politics,
    Sports,
    Economics,
    Entertainment,
}

impl Topic {
    /// Every topic, in the order they are listed in the prompt.
    pub const ALL: [Topic; 4] = [
        Topic::Politics,
        Topic::Sports,
        Topic::Economics,
        Topic::Entertainment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Politics => "Politics",
            Topic::Sports => "Sports",
            Topic::Economics => "Economics",
            Topic::Entertainment => "Entertainment",
        }
    }

    /// Case-insensitive exact match against the label names.
    pub fn from_label(s: &str) -> Option<Self> {
        Topic::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Render a label set as `"Politics, Sports, …"` for prompts.
    pub fn join(labels: &[Topic]) -> String {
        labels
            .iter()
            .map(Topic::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_ignores_case_and_padding() {
        assert_eq!(Topic::from_label("sports"), Some(Topic::Sports));
        assert_eq!(Topic::from_label("  ECONOMICS\n"), Some(Topic::Economics));
        assert_eq!(Topic::from_label("Weather"), None);
        assert_eq!(Topic::from_label(""), None);
    }

    #[test]
    fn join_keeps_prompt_order() {
        assert_eq!(
            Topic::join(&Topic::ALL),
            "Politics, Sports, Economics, Entertainment"
        );
    }

    #[test]
    fn error_label_is_not_a_topic() {
        assert_eq!(Topic::from_label(ERROR_LABEL), None);
    }
}
