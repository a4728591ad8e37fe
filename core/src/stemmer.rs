//! Porter suffix-stripping stemmer (M. F. Porter, 1980) for English words.
//!
//! The stemmer works on an owned byte buffer created per call. Every index
//! access is bounds checked; any failed check aborts stemming of that word
//! and [`stem`] hands the input back unchanged. The same fallback applies to
//! empty and non-ASCII input. Callers lowercase before stemming.

/// Why a word could not be stemmed. [`stem`] maps all of these to "return the
/// input unchanged".
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StemError {
    #[error("empty word")]
    Empty,
    #[error("word contains non-ASCII characters")]
    NonAscii,
    #[error("stem buffer index {0} out of bounds")]
    OutOfBounds(usize),
}

type StepResult<T = ()> = Result<T, StemError>;

// Checked in order; the first suffix that matches is the only one tried.
const STEP2: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("bli", "ble"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
    ("logi", "log"),
];

const STEP3: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const STEP4: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

/// Stem `word`, returning it unchanged when it cannot be stemmed.
pub fn stem(word: &str) -> String {
    try_stem(word).unwrap_or_else(|_| word.to_owned())
}

/// Stem `word`, reporting why it was left alone instead of falling back.
///
/// Words of two characters or fewer are returned as they are.
pub fn try_stem(word: &str) -> Result<String, StemError> {
    if word.is_empty() {
        return Err(StemError::Empty);
    }
    if !word.is_ascii() {
        return Err(StemError::NonAscii);
    }
    if word.len() <= 2 {
        return Ok(word.to_owned());
    }

    let mut buf = Buffer::new(word);
    buf.step1ab()?;
    if buf.b.len() > 1 {
        buf.step1c()?;
        buf.step2()?;
        buf.step3()?;
        buf.step4()?;
        buf.step5()?;
    }
    String::from_utf8(buf.b).map_err(|_| StemError::NonAscii)
}

fn is_vowel(ch: u8) -> bool {
    matches!(ch, b'a' | b'e' | b'i' | b'o' | b'u')
}

/// Working word plus the cut position `j` recorded by the last successful
/// [`Buffer::ends`]: `b[..j]` is the stem in front of the matched suffix.
struct Buffer {
    b: Vec<u8>,
    j: usize,
}

impl Buffer {
    fn new(word: &str) -> Self {
        Self { b: word.as_bytes().to_vec(), j: 0 }
    }

    fn at(&self, i: usize) -> StepResult<u8> {
        self.b.get(i).copied().ok_or(StemError::OutOfBounds(i))
    }

    fn last_index(&self) -> StepResult<usize> {
        self.b.len().checked_sub(1).ok_or(StemError::OutOfBounds(0))
    }

    fn last(&self) -> StepResult<u8> {
        self.at(self.last_index()?)
    }

    /// 'y' is a consonant at the start of a word or after a vowel, so inside
    /// a run of y's the class alternates from the run's first letter.
    fn is_consonant(&self, i: usize) -> StepResult<bool> {
        let ch = self.at(i)?;
        if ch != b'y' {
            return Ok(!is_vowel(ch));
        }
        let mut start = i;
        while start > 0 && self.at(start - 1)? == b'y' {
            start -= 1;
        }
        let first = start == 0 || is_vowel(self.at(start - 1)?);
        Ok(first == ((i - start) % 2 == 0))
    }

    /// Consonant flags for `b[..end]` in one forward pass.
    fn consonants(&self, end: usize) -> StepResult<Vec<bool>> {
        let mut flags: Vec<bool> = Vec::with_capacity(end);
        for i in 0..end {
            let consonant = match self.at(i)? {
                b'y' => flags.last().map_or(true, |&prev| !prev),
                ch => !is_vowel(ch),
            };
            flags.push(consonant);
        }
        Ok(flags)
    }

    /// Number of vowel-to-consonant transitions in `b[..j]`: the `m` of
    /// `[C](VC)^m[V]`.
    fn measure(&self) -> StepResult<usize> {
        let flags = self.consonants(self.j)?;
        Ok(flags.windows(2).filter(|w| !w[0] && w[1]).count())
    }

    fn vowel_in_stem(&self) -> StepResult<bool> {
        Ok(self.consonants(self.j)?.contains(&false))
    }

    fn double_consonant(&self, i: usize) -> StepResult<bool> {
        if i < 1 {
            return Ok(false);
        }
        Ok(self.at(i)? == self.at(i - 1)? && self.is_consonant(i)?)
    }

    /// consonant-vowel-consonant ending at `i`, where the last consonant is
    /// not w, x or y.
    fn cvc(&self, i: usize) -> StepResult<bool> {
        if i < 2
            || !self.is_consonant(i)?
            || self.is_consonant(i - 1)?
            || !self.is_consonant(i - 2)?
        {
            return Ok(false);
        }
        Ok(!matches!(self.at(i)?, b'w' | b'x' | b'y'))
    }

    fn ends(&mut self, suffix: &str) -> bool {
        if self.b.ends_with(suffix.as_bytes()) {
            self.j = self.b.len() - suffix.len();
            true
        } else {
            false
        }
    }

    fn set_to(&mut self, replacement: &str) {
        self.b.truncate(self.j);
        self.b.extend_from_slice(replacement.as_bytes());
    }

    fn replace_if_measured(&mut self, replacement: &str) -> StepResult {
        if self.measure()? > 0 {
            self.set_to(replacement);
        }
        Ok(())
    }

    /// Plurals and -ed / -ing.
    fn step1ab(&mut self) -> StepResult {
        if self.last()? == b's' {
            if self.ends("sses") {
                self.b.truncate(self.b.len() - 2);
            } else if self.ends("ies") {
                self.set_to("i");
            } else if self.at(self.last_index()?.saturating_sub(1))? != b's' {
                self.b.pop();
            }
        }

        if self.ends("eed") {
            if self.measure()? > 0 {
                self.b.pop();
            }
        } else if (self.ends("ed") || self.ends("ing")) && self.vowel_in_stem()? {
            self.b.truncate(self.j);
            if self.ends("at") {
                self.set_to("ate");
            } else if self.ends("bl") {
                self.set_to("ble");
            } else if self.ends("iz") {
                self.set_to("ize");
            } else if self.double_consonant(self.last_index()?)? {
                if !matches!(self.last()?, b'l' | b's' | b'z') {
                    self.b.pop();
                }
            } else if self.measure()? == 1 && self.cvc(self.last_index()?)? {
                self.b.push(b'e');
            }
        }
        Ok(())
    }

    /// Terminal y becomes i when there is another vowel in the stem.
    fn step1c(&mut self) -> StepResult {
        if self.ends("y") && self.vowel_in_stem()? {
            let i = self.last_index()?;
            if let Some(ch) = self.b.get_mut(i) {
                *ch = b'i';
            }
        }
        Ok(())
    }

    fn step2(&mut self) -> StepResult {
        for &(suffix, replacement) in STEP2 {
            if self.ends(suffix) {
                return self.replace_if_measured(replacement);
            }
        }
        Ok(())
    }

    fn step3(&mut self) -> StepResult {
        for &(suffix, replacement) in STEP3 {
            if self.ends(suffix) {
                return self.replace_if_measured(replacement);
            }
        }
        Ok(())
    }

    fn step4(&mut self) -> StepResult {
        for &suffix in STEP4 {
            if !self.ends(suffix) {
                continue;
            }
            if suffix == "ion" {
                let follows_s_or_t =
                    self.j >= 1 && matches!(self.at(self.j - 1)?, b's' | b't');
                if !follows_s_or_t {
                    continue;
                }
            }
            if self.measure()? > 1 {
                self.b.truncate(self.j);
            }
            return Ok(());
        }
        Ok(())
    }

    /// Final -e and -ll.
    fn step5(&mut self) -> StepResult {
        self.j = self.b.len();
        if self.last()? == b'e' {
            let m = self.measure()?;
            let before = self.last_index()?.saturating_sub(1);
            if m > 1 || (m == 1 && !self.cvc(before)?) {
                self.b.pop();
            }
        }

        self.j = self.b.len();
        if self.last()? == b'l'
            && self.double_consonant(self.last_index()?)?
            && self.measure()? > 1
        {
            self.b.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(pairs: &[(&str, &str)]) {
        for (word, expected) in pairs {
            assert_eq!(stem(word), *expected, "stem({word:?})");
        }
    }

    #[test]
    fn reference_vectors() {
        check(&[
            ("running", "run"),
            ("happiness", "happi"),
            ("relational", "relat"),
            ("agreed", "agre"),
            ("feed", "feed"),
            ("plastered", "plaster"),
        ]);
    }

    #[test]
    fn plurals_and_participles() {
        check(&[
            ("caresses", "caress"),
            ("ponies", "poni"),
            ("ties", "ti"),
            ("caress", "caress"),
            ("cats", "cat"),
            ("hopping", "hop"),
            ("falling", "fall"),
            ("hissing", "hiss"),
            ("filing", "file"),
            ("sized", "size"),
        ]);
    }

    #[test]
    fn terminal_y() {
        check(&[("happy", "happi"), ("sky", "sky")]);
    }

    #[test]
    fn derivational_suffixes() {
        check(&[
            ("generalization", "gener"),
            ("hopeful", "hope"),
            ("adjustment", "adjust"),
            ("controll", "control"),
            ("roll", "roll"),
        ]);
    }

    #[test]
    fn ion_needs_a_preceding_s_or_t() {
        check(&[("adoption", "adopt"), ("communion", "communion")]);
    }

    #[test]
    fn final_e_respects_measure_and_cvc() {
        check(&[("probate", "probat"), ("rate", "rate"), ("cease", "ceas")]);
    }

    #[test]
    fn step1b_repairs_at_and_bl() {
        check(&[("conflated", "conflat"), ("troubled", "troubl")]);
    }

    #[test]
    fn step3_suffixes() {
        check(&[
            ("triplicate", "triplic"),
            ("formalize", "formal"),
            ("electrical", "electr"),
        ]);
    }

    #[test]
    fn y_runs_alternate_between_consonant_and_vowel() {
        let buf = Buffer::new("yyyay");
        let flags: Vec<bool> = (0..5).map(|i| buf.is_consonant(i).unwrap()).collect();
        assert_eq!(flags, vec![true, false, true, false, true]);
        assert_eq!(buf.consonants(5).unwrap(), flags);
    }

    #[test]
    fn long_y_run_stems_on_a_small_stack() {
        let word = format!("{}ed", "y".repeat(200_000));
        let stemmed = std::thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(move || stem(&word))
            .unwrap()
            .join()
            .unwrap();
        assert!(stemmed.starts_with("yyy"));
        assert!(!stemmed.ends_with("ed"));
    }

    #[test]
    fn short_words_pass_through() {
        check(&[("is", "is"), ("a", "a"), ("as", "as")]);
    }

    #[test]
    fn empty_and_non_ascii_fall_back_to_input() {
        assert_eq!(try_stem(""), Err(StemError::Empty));
        assert_eq!(try_stem("cafés"), Err(StemError::NonAscii));
        assert_eq!(stem(""), "");
        assert_eq!(stem("cafés"), "cafés");
    }

    #[test]
    fn is_deterministic() {
        for w in ["generalizations", "conditional", "electrical", "yyyy", "sses"] {
            assert_eq!(stem(w), stem(w));
        }
    }
}
