//! Stopword filtering
//!
//! Multi-language stopword lists come from the `stop-words` crate; callers can
//! also supply an explicit list or extend/shrink a loaded one.

use rustc_hash::FxHashSet;
use stop_words::{get, LANGUAGE};

/// A filter for removing stopwords from normalized tokens
#[derive(Debug, Clone)]
pub struct StopwordFilter {
    /// Set of stopwords (lowercase)
    stopwords: FxHashSet<String>,
}

impl Default for StopwordFilter {
    fn default() -> Self {
        Self::new("en")
    }
}

impl StopwordFilter {
    /// Create a new stopword filter for the given language
    ///
    /// Unknown language codes fall back to English.
    pub fn new(language: &str) -> Self {
        Self {
            stopwords: Self::load_stopwords(language),
        }
    }

    /// Create an empty stopword filter (no filtering)
    pub fn empty() -> Self {
        Self {
            stopwords: FxHashSet::default(),
        }
    }

    /// Create a stopword filter from a custom list
    pub fn from_list<S: AsRef<str>>(words: &[S]) -> Self {
        Self {
            stopwords: words.iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    /// Add additional stopwords to the filter
    pub fn add_stopwords<S: AsRef<str>>(&mut self, words: &[S]) {
        for word in words {
            self.stopwords.insert(word.as_ref().to_lowercase());
        }
    }

    /// Remove stopwords from the filter
    pub fn remove_stopwords<S: AsRef<str>>(&mut self, words: &[S]) {
        for word in words {
            self.stopwords.remove(&word.as_ref().to_lowercase());
        }
    }

    /// Check if an already-lowercased word is a stopword
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Get the number of stopwords in the filter
    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    /// Check if the filter is empty
    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }

    /// Check whether `language` names a built-in stopword list
    pub fn is_supported_language(language: &str) -> bool {
        lookup_language(language).is_some()
    }

    fn load_stopwords(language: &str) -> FxHashSet<String> {
        let lang = lookup_language(language).unwrap_or(LANGUAGE::English);
        get(lang).iter().map(|s| s.to_lowercase()).collect()
    }
}

fn lookup_language(language: &str) -> Option<LANGUAGE> {
    let lang = match language.to_lowercase().as_str() {
        "en" | "english" => LANGUAGE::English,
        "de" | "german" => LANGUAGE::German,
        "fr" | "french" => LANGUAGE::French,
        "es" | "spanish" => LANGUAGE::Spanish,
        "it" | "italian" => LANGUAGE::Italian,
        "pt" | "portuguese" => LANGUAGE::Portuguese,
        "nl" | "dutch" => LANGUAGE::Dutch,
        "ru" | "russian" => LANGUAGE::Russian,
        "sv" | "swedish" => LANGUAGE::Swedish,
        "pl" | "polish" => LANGUAGE::Polish,
        "tr" | "turkish" => LANGUAGE::Turkish,
        _ => return None,
    };
    Some(lang)
}
