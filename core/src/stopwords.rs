use crate::Result;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

const ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but", "by",
    "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "of", "off", "on", "once", "only", "or",
    "other", "ought", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

/// Case-insensitive stop-word set. Words are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopWords {
    words: BTreeSet<String>,
}

impl StopWords {
    pub fn new() -> Self { Self::default() }

    /// Built-in English list.
    pub fn english() -> Self {
        ENGLISH.iter().copied().collect()
    }

    /// Parse a line-delimited word list; surrounding whitespace is trimmed
    /// and blank lines are skipped.
    pub fn parse(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn insert(&mut self, word: &str) -> bool {
        self.words.insert(word.to_lowercase())
    }

    pub fn remove(&mut self, word: &str) -> bool {
        self.words.remove(fold(word).as_ref())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(fold(word).as_ref())
    }

    pub fn len(&self) -> usize { self.words.len() }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }

    /// Words in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for StopWords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for word in iter {
            set.insert(word.as_ref());
        }
        set
    }
}

fn fold(word: &str) -> Cow<'_, str> {
    if word.chars().any(char::is_uppercase) {
        Cow::Owned(word.to_lowercase())
    } else {
        Cow::Borrowed(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_blank_lines_and_lowercases() {
        let stop = StopWords::parse("The\n\n  on \n\t\nAND\n");
        assert_eq!(stop.len(), 3);
        assert_eq!(stop.iter().collect::<Vec<_>>(), vec!["and", "on", "the"]);
    }

    #[test]
    fn membership_is_case_insensitive() {
        let stop = StopWords::parse("the");
        assert!(stop.contains("the"));
        assert!(stop.contains("THE"));
        assert!(stop.contains("ThE"));
        assert!(!stop.contains("then"));
    }

    #[test]
    fn runtime_add_and_remove() {
        let mut stop = StopWords::new();
        assert!(stop.insert("Foo"));
        assert!(!stop.insert("foo"));
        assert!(stop.contains("foo"));
        assert!(stop.remove("FOO"));
        assert!(!stop.contains("foo"));
        assert!(stop.is_empty());
    }

    #[test]
    fn english_list_covers_common_words() {
        let stop = StopWords::english();
        for w in ["the", "and", "on", "of", "is"] {
            assert!(stop.contains(w), "{w} should be a stop word");
        }
        assert!(!stop.contains("cat"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StopWords::load(dir.path().join("nope.txt")).is_err());
    }
}
