//! User preference snapshot consumed by filtering and ranking.

use std::collections::BTreeSet;

use parking_lot::RwLock;

/// Quality, language and provider preferences for one resolution call.
///
/// Every field may be empty. An empty preference never fails a call, it
/// simply stops distinguishing candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceConfig {
    /// Token matched against candidate labels, e.g. "720p" or "Okru:1080p"
    pub preferred_quality: String,
    /// Token matched case-insensitively against candidate labels
    pub preferred_language: String,
    /// Embed rows whose text contains none of these are skipped; empty allows all
    pub allowed_languages: BTreeSet<String>,
}

impl PreferenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.preferred_quality = quality.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.preferred_language = language.into();
        self
    }

    pub fn with_allowed_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Checks whether text surrounding an embed passes the allowed-language filter.
    ///
    /// Matching is a case-sensitive substring test, mirroring how row text
    /// is compared against the configured language names.
    pub fn allows(&self, text: &str) -> bool {
        self.allowed_languages.is_empty()
            || self
                .allowed_languages
                .iter()
                .any(|language| text.contains(language.as_str()))
    }
}

/// Read access to the user's current preferences.
pub trait PreferenceSource: Send + Sync + std::fmt::Debug {
    /// Returns an immutable snapshot for the duration of one call.
    fn snapshot(&self) -> PreferenceConfig;
}

/// In-process preference store.
#[derive(Debug, Default)]
pub struct StaticPreferences {
    current: RwLock<PreferenceConfig>,
}

impl StaticPreferences {
    pub fn new(config: PreferenceConfig) -> Self {
        Self {
            current: RwLock::new(config),
        }
    }

    /// Replaces the stored preferences; later snapshots observe the update.
    pub fn update(&self, config: PreferenceConfig) {
        *self.current.write() = config;
    }
}

impl PreferenceSource for StaticPreferences {
    fn snapshot(&self) -> PreferenceConfig {
        self.current.read().clone()
    }
}
