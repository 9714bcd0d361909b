use std::fmt;

// === HistoryError ===

/// Errors related to browsing history operations.
#[derive(Debug)]
pub enum HistoryError {
    /// History entry with the given ID was not found.
    NotFound(String),
    /// History recording is turned off (private mode).
    RecordingDisabled,
    /// Caller-supplied value is malformed (e.g. a bad date).
    InvalidInput(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::NotFound(id) => write!(f, "History entry not found: {}", id),
            HistoryError::RecordingDisabled => {
                write!(f, "History recording is disabled (private mode)")
            }
            HistoryError::InvalidInput(msg) => write!(f, "Invalid history input: {}", msg),
            HistoryError::DatabaseError(msg) => write!(f, "History database error: {}", msg),
        }
    }
}

impl std::error::Error for HistoryError {}

// === MetadataError ===

/// Errors related to history metadata operations.
#[derive(Debug)]
pub enum MetadataError {
    /// No metadata exists for the given URL.
    NotFound(String),
    /// The observation cannot be applied (e.g. negative view time).
    InvalidObservation(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataError::NotFound(url) => write!(f, "History metadata not found: {}", url),
            MetadataError::InvalidObservation(msg) => {
                write!(f, "Invalid metadata observation: {}", msg)
            }
            MetadataError::DatabaseError(msg) => {
                write!(f, "History metadata database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for MetadataError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === SuggestionError ===

/// Errors surfaced by the combined suggestion provider.
///
/// Backend failures are passed through untouched so callers can tell which
/// store failed.
#[derive(Debug)]
pub enum SuggestionError {
    /// The legacy history store failed.
    History(HistoryError),
    /// The history metadata store failed.
    Metadata(MetadataError),
    /// The provider was configured with an unusable value.
    InvalidConfig(String),
}

impl fmt::Display for SuggestionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionError::History(e) => write!(f, "History suggestions failed: {}", e),
            SuggestionError::Metadata(e) => write!(f, "Metadata suggestions failed: {}", e),
            SuggestionError::InvalidConfig(msg) => {
                write!(f, "Invalid suggestion provider config: {}", msg)
            }
        }
    }
}

impl std::error::Error for SuggestionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SuggestionError::History(e) => Some(e),
            SuggestionError::Metadata(e) => Some(e),
            SuggestionError::InvalidConfig(_) => None,
        }
    }
}

impl From<HistoryError> for SuggestionError {
    fn from(e: HistoryError) -> Self {
        SuggestionError::History(e)
    }
}

impl From<MetadataError> for SuggestionError {
    fn from(e: MetadataError) -> Self {
        SuggestionError::Metadata(e)
    }
}
