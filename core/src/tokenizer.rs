use lazy_static::lazy_static;
use regex::{Matches, Regex};

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\p{L}+").expect("valid regex");
}

/// Lazy sequence of raw tokens over one piece of text.
///
/// A token is a maximal run of Unicode letters; digits, punctuation and
/// whitespace all act as separators. Tokens are returned exactly as they
/// appear in the input (no case folding), so the sequence borrows from the
/// text and calling [`tokenize`] again restarts it.
pub struct Tokens<'t> {
    inner: Matches<'static, 't>,
}

impl<'t> Iterator for Tokens<'t> {
    type Item = &'t str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|m| m.as_str())
    }
}

pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens { inner: WORD.find_iter(text) }
}
