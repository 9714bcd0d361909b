//! Combined history suggestion provider.
//!
//! Queries the history metadata store and the legacy history store
//! concurrently, merges the candidates by URL, ranks them by score and
//! truncates to the configured maximum.

use std::collections::HashMap;

use url::Url;
use uuid::Uuid;

use crate::services::storage::{HistoryMetadataStorage, HistoryStorage};
use crate::types::errors::SuggestionError;
use crate::types::history::SearchResult;
use crate::types::metadata::HistoryMetadata;
use crate::types::settings::{
    SuggestionSettings, DEFAULT_COMBINED_SUGGESTION_LIMIT, MAX_NUMBER_OF_SUGGESTIONS,
};
use crate::types::suggestion::Suggestion;

/// Host prefixes treated as the same site as the bare host.
const MOBILE_HOST_PREFIXES: [&str; 3] = ["www.", "m.", "mobile."];

/// Address-bar provider merging metadata and legacy history suggestions.
#[derive(Clone)]
pub struct CombinedHistorySuggestionProvider<M, H> {
    id: String,
    metadata_storage: M,
    history_storage: H,
    max_number_of_suggestions: usize,
    results_host_filter: Option<String>,
    suggestions_header: Option<String>,
}

impl<M, H> CombinedHistorySuggestionProvider<M, H>
where
    M: HistoryMetadataStorage,
    H: HistoryStorage,
{
    /// Creates a provider returning at most `DEFAULT_COMBINED_SUGGESTION_LIMIT` suggestions.
    pub fn new(metadata_storage: M, history_storage: H) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            metadata_storage,
            history_storage,
            max_number_of_suggestions: DEFAULT_COMBINED_SUGGESTION_LIMIT,
            results_host_filter: None,
            suggestions_header: None,
        }
    }

    /// Creates a provider configured from `settings`.
    pub fn from_settings(
        metadata_storage: M,
        history_storage: H,
        settings: &SuggestionSettings,
    ) -> Result<Self, SuggestionError> {
        let mut provider = Self::new(metadata_storage, history_storage)
            .with_max_number_of_suggestions(settings.max_number_of_suggestions)?;
        provider.results_host_filter = settings.results_host_filter.clone();
        provider.suggestions_header = settings.suggestions_header.clone();
        Ok(provider)
    }

    /// Sets the output bound. Must be within `1..=MAX_NUMBER_OF_SUGGESTIONS`.
    pub fn with_max_number_of_suggestions(mut self, max: usize) -> Result<Self, SuggestionError> {
        validate_max_number_of_suggestions(max)?;
        self.max_number_of_suggestions = max;
        Ok(self)
    }

    /// Only suggest URLs on `host` (ignoring `www.`, `m.` and `mobile.` prefixes).
    pub fn with_results_host_filter(mut self, host: impl Into<String>) -> Self {
        self.results_host_filter = Some(host.into());
        self
    }

    pub fn with_suggestions_header(mut self, header: impl Into<String>) -> Self {
        self.suggestions_header = Some(header.into());
        self
    }

    /// Unique id of this provider instance, stamped on every suggestion.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> Option<&str> {
        self.suggestions_header.as_deref()
    }

    pub fn max_number_of_suggestions(&self) -> usize {
        self.max_number_of_suggestions
    }

    /// Produces the ranked suggestions for the text currently in the address bar.
    ///
    /// Blank input returns no suggestions without touching either store.
    /// A failure in either store is returned as-is.
    pub async fn on_input_changed(&self, text: &str) -> Result<Vec<Suggestion>, SuggestionError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let limit = self.max_number_of_suggestions;
        let (metadata, history) = tokio::try_join!(
            async {
                self.metadata_storage
                    .query_history_metadata(text, limit)
                    .await
                    .map_err(|e| {
                        tracing::warn!(error = %e, "history metadata query failed");
                        SuggestionError::from(e)
                    })
            },
            async {
                self.history_storage
                    .get_suggestions(text, limit)
                    .await
                    .map_err(|e| {
                        tracing::warn!(error = %e, "history query failed");
                        SuggestionError::from(e)
                    })
            },
        )?;

        tracing::debug!(
            metadata = metadata.len(),
            history = history.len(),
            "fetched suggestion candidates"
        );

        let (metadata, history) = match self.results_host_filter.as_deref() {
            Some(host) => (
                metadata
                    .into_iter()
                    .filter(|m| url_matches_host(&m.key.url, host))
                    .collect(),
                history
                    .into_iter()
                    .filter(|h| url_matches_host(&h.url, host))
                    .collect(),
            ),
            None => (metadata, history),
        };

        Ok(merge_suggestions(&self.id, metadata, history, limit))
    }
}

/// Rejects limits outside `1..=MAX_NUMBER_OF_SUGGESTIONS`.
pub fn validate_max_number_of_suggestions(max: usize) -> Result<(), SuggestionError> {
    if max == 0 || max > MAX_NUMBER_OF_SUGGESTIONS {
        return Err(SuggestionError::InvalidConfig(format!(
            "max_number_of_suggestions must be between 1 and {}, got {}",
            MAX_NUMBER_OF_SUGGESTIONS, max
        )));
    }
    Ok(())
}

struct Candidate {
    url: String,
    title: Option<String>,
    view_time: i64,
    from_metadata: bool,
    legacy_score: Option<i32>,
    occurrences: i64,
}

impl Candidate {
    fn score(&self) -> i32 {
        let score = match (self.from_metadata, self.legacy_score) {
            (true, Some(legacy)) => i64::from(legacy) + self.occurrences,
            (false, Some(legacy)) => i64::from(legacy),
            (_, None) => self.view_time,
        };
        i32::try_from(score).unwrap_or(if score < 0 { i32::MIN } else { i32::MAX })
    }

    fn fill_title(&mut self, title: &str) {
        if self.title.is_none() && !title.is_empty() {
            self.title = Some(title.to_string());
        }
    }
}

/// Merges metadata and legacy history candidates into ranked suggestions.
///
/// URL is the identity key. Metadata rows form the base set and score their
/// summed view time. A URL also returned by the legacy store scores the
/// legacy score plus one per candidate row carrying it. Legacy-only URLs keep
/// their legacy score. The result is sorted by score, highest first, ties in
/// first-seen order, and holds at most `max` entries.
pub fn merge_suggestions(
    provider_id: &str,
    metadata: Vec<HistoryMetadata>,
    history: Vec<SearchResult>,
    max: usize,
) -> Vec<Suggestion> {
    let mut candidates: Vec<Candidate> = Vec::with_capacity(metadata.len() + history.len());
    let mut by_url: HashMap<String, usize> = HashMap::new();

    for entry in metadata {
        let view_time = i64::from(entry.total_view_time.max(0));
        match by_url.get(&entry.key.url) {
            Some(&i) => {
                let candidate = &mut candidates[i];
                candidate.view_time += view_time;
                candidate.occurrences += 1;
                if let Some(title) = entry.title.as_deref() {
                    candidate.fill_title(title);
                }
            }
            None => {
                by_url.insert(entry.key.url.clone(), candidates.len());
                candidates.push(Candidate {
                    title: entry.title.filter(|t| !t.is_empty()),
                    url: entry.key.url,
                    view_time,
                    from_metadata: true,
                    legacy_score: None,
                    occurrences: 1,
                });
            }
        }
    }

    for result in history {
        match by_url.get(&result.url) {
            Some(&i) => {
                let candidate = &mut candidates[i];
                candidate.legacy_score = Some(
                    candidate
                        .legacy_score
                        .map_or(result.score, |s| s.max(result.score)),
                );
                candidate.occurrences += 1;
                candidate.fill_title(&result.title);
            }
            None => {
                by_url.insert(result.url.clone(), candidates.len());
                candidates.push(Candidate {
                    title: Some(result.title).filter(|t| !t.is_empty()),
                    url: result.url,
                    view_time: 0,
                    from_metadata: false,
                    legacy_score: Some(result.score),
                    occurrences: 1,
                });
            }
        }
    }

    let mut scored: Vec<(i32, Candidate)> = candidates
        .into_iter()
        .map(|c| (c.score(), c))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(max);

    scored
        .into_iter()
        .map(|(score, c)| Suggestion {
            id: c.url.clone(),
            provider_id: provider_id.to_string(),
            title: c.title.unwrap_or_else(|| c.url.clone()),
            description: c.url.clone(),
            url: c.url,
            score,
        })
        .collect()
}

/// Strips one leading `www.`, `m.` or `mobile.` label and lowercases.
fn normalize_host(host: &str) -> String {
    let host = host.to_ascii_lowercase();
    MOBILE_HOST_PREFIXES
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
        .map(str::to_string)
        .unwrap_or(host)
}

/// Whether `url` lives on `host`, treating mobile subdomains as the same site.
/// Unparseable URLs never match.
pub fn url_matches_host(url: &str, host: &str) -> bool {
    match Url::parse(url).ok().as_ref().and_then(Url::host_str) {
        Some(url_host) => normalize_host(url_host) == normalize_host(host),
        None => false,
    }
}
