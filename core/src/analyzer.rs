use crate::stemmer;
use crate::stopwords::StopWords;
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Normalisation shared by indexing and querying: NFKC + lowercase, then the
/// stop filter on the unstemmed form, then stemming.
///
/// Without a stop list every token passes the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analyzer {
    stop_words: Option<StopWords>,
    stemming: bool,
}

impl Analyzer {
    pub fn new(stop_words: Option<StopWords>, stemming: bool) -> Self {
        Self { stop_words, stemming }
    }

    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = Some(stop_words);
        self
    }

    pub fn with_stemming(mut self, stemming: bool) -> Self {
        self.stemming = stemming;
        self
    }

    pub fn stop_words(&self) -> Option<&StopWords> { self.stop_words.as_ref() }

    pub fn stop_words_mut(&mut self) -> Option<&mut StopWords> { self.stop_words.as_mut() }

    pub fn stemming(&self) -> bool { self.stemming }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.as_ref().is_some_and(|s| s.contains(token))
    }

    /// Normalised form of one raw token, or `None` when it is filtered out.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let folded: String = raw.nfkc().collect::<String>().to_lowercase();
        if folded.is_empty() || self.is_stop_word(&folded) {
            return None;
        }
        if !self.stemming {
            return Some(folded);
        }
        match stemmer::try_stem(&folded) {
            Ok(stem) => Some(stem),
            Err(err) => {
                tracing::trace!(token = %folded, %err, "indexing token unstemmed");
                Some(folded)
            }
        }
    }

    /// Lazily tokenize and normalise `text`.
    pub fn analyze<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        tokenize(text).filter_map(move |tok| self.normalize(tok))
    }
}
