use serde::{Deserialize, Serialize};

/// Upper bound accepted for `max_number_of_suggestions`.
pub const MAX_NUMBER_OF_SUGGESTIONS: usize = 100;

/// Default number of combined suggestions returned per query.
pub const DEFAULT_COMBINED_SUGGESTION_LIMIT: usize = 20;

/// Top-level settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AwesomebarSettings {
    pub suggestions: SuggestionSettings,
    pub history: HistorySettings,
}

/// Settings for the combined history suggestion provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestionSettings {
    pub max_number_of_suggestions: usize,
    /// Only suggest pages on this host, ignoring `www.`/`m.`/`mobile.` prefixes.
    #[serde(default)]
    pub results_host_filter: Option<String>,
    #[serde(default)]
    pub suggestions_header: Option<String>,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            max_number_of_suggestions: DEFAULT_COMBINED_SUGGESTION_LIMIT,
            results_host_filter: None,
            suggestions_header: None,
        }
    }
}

/// What gets written to the history stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistorySettings {
    pub record_history: bool,
    #[serde(default = "default_true")]
    pub record_metadata: bool,
}

fn default_true() -> bool {
    true
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            record_history: true,
            record_metadata: true,
        }
    }
}
