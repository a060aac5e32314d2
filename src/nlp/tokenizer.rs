//! Sentence splitting and token normalization
//!
//! Sentences keep their original text for display; the normalized terms
//! (lowercased, punctuation stripped, stopwords removed) exist only to feed
//! the similarity measure and keyword extraction.

use super::stopwords::StopwordFilter;
use crate::types::{Review, Sentence};
use rayon::prelude::*;
use unicode_segmentation::UnicodeSegmentation;

/// Below this many reviews the corpus is split sequentially
const PARALLEL_MIN_REVIEWS: usize = 64;

/// Splits review text into sentences and normalizes their tokens
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stopwords: StopwordFilter,
    min_token_length: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(StopwordFilter::default())
    }
}

impl Tokenizer {
    /// Create a tokenizer with the given stopword filter
    pub fn new(stopwords: StopwordFilter) -> Self {
        Self {
            stopwords,
            min_token_length: 2,
        }
    }

    /// Set the minimum token length (in characters) kept after normalization
    pub fn with_min_token_length(mut self, min_token_length: usize) -> Self {
        self.min_token_length = min_token_length;
        self
    }

    /// The stopword filter in use
    pub fn stopwords(&self) -> &StopwordFilter {
        &self.stopwords
    }

    /// Normalize a piece of text into terms
    pub fn normalize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .map(str::to_lowercase)
            .filter(|w| w.chars().count() >= self.min_token_length)
            .filter(|w| !self.stopwords.is_stopword(w))
            .collect()
    }

    /// Lazily iterate over the sentences of one text
    ///
    /// The iterator is cheap to clone, so the sequence can be restarted.
    pub fn sentences<'t, 'a>(&'t self, review_id: &'a str, text: &'a str) -> Sentences<'t, 'a> {
        Sentences {
            tokenizer: self,
            review_id,
            rest: text,
            position: 0,
            base_index: 0,
        }
    }

    /// Split every review in the corpus, assigning corpus-wide sentence indices
    ///
    /// The outer vector is parallel to `reviews`.
    pub fn split_corpus(&self, reviews: &[Review]) -> Vec<Vec<Sentence>> {
        let split = |review: &Review| -> Vec<Sentence> {
            self.sentences(&review.id, &review.text).collect()
        };

        let mut per_review: Vec<Vec<Sentence>> = if reviews.len() < PARALLEL_MIN_REVIEWS {
            reviews.iter().map(split).collect()
        } else {
            reviews.par_iter().map(split).collect()
        };

        let mut offset = 0;
        for sentences in &mut per_review {
            for sentence in sentences.iter_mut() {
                sentence.index = offset + sentence.position;
            }
            offset += sentences.len();
        }

        per_review
    }
}

/// Iterator over the sentences of a single text
#[derive(Debug, Clone)]
pub struct Sentences<'t, 'a> {
    tokenizer: &'t Tokenizer,
    review_id: &'a str,
    rest: &'a str,
    position: usize,
    base_index: usize,
}

impl<'t, 'a> Sentences<'t, 'a> {
    /// Offset the corpus-wide index of every yielded sentence
    pub fn with_base_index(mut self, base_index: usize) -> Self {
        self.base_index = base_index;
        self
    }
}

impl<'t, 'a> Iterator for Sentences<'t, 'a> {
    type Item = Sentence;

    fn next(&mut self) -> Option<Sentence> {
        while !self.rest.is_empty() {
            let end = segment_end(self.rest);
            let (segment, rest) = self.rest.split_at(end);
            self.rest = rest;

            let trimmed = segment.trim();
            if trimmed.is_empty() {
                continue;
            }

            let position = self.position;
            self.position += 1;
            return Some(Sentence::new(
                trimmed,
                self.review_id,
                position,
                self.base_index + position,
                self.tokenizer.normalize(trimmed),
            ));
        }
        None
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '…' | '。' | '！' | '？')
}

fn is_closing(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '”' | '’' | '»')
}

/// Byte offset just past the end of the first sentence in `text`
fn segment_end(text: &str) -> usize {
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\n' {
            return i + c.len_utf8();
        }
        if !is_terminator(c) {
            continue;
        }
        // "3.5" and "v2.0" are not boundaries
        if c == '.' {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_alphanumeric() {
                    continue;
                }
            }
        }
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if is_terminator(next) || is_closing(next) {
                end = j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        return end;
    }
    text.len()
}
