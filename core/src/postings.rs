use crate::DocId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// One (document, in-document frequency) pair. Identity is the document id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub frequency: u32,
}

impl Posting {
    pub fn new(doc_id: DocId, frequency: u32) -> Self {
        Self { doc_id, frequency }
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.doc_id, self.frequency)
    }
}

/// Postings of one term, kept in strictly increasing `doc_id` order with no
/// duplicates after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingList {
    postings: Vec<Posting>,
}

impl PostingList {
    pub const fn new() -> Self {
        Self { postings: Vec::new() }
    }

    /// Record one more occurrence in `doc_id`. Returns true when the document
    /// was not in the list yet.
    pub fn add(&mut self, doc_id: DocId) -> bool {
        self.add_with_frequency(doc_id, 1)
    }

    /// Record `frequency` occurrences in `doc_id`, adding to an existing
    /// posting. Returns true when the document was not in the list yet.
    /// A zero frequency leaves the list untouched.
    pub fn add_with_frequency(&mut self, doc_id: DocId, frequency: u32) -> bool {
        if frequency == 0 {
            return false;
        }
        match self.postings.binary_search_by_key(&doc_id, |p| p.doc_id) {
            Ok(idx) => {
                let posting = &mut self.postings[idx];
                posting.frequency = posting.frequency.saturating_add(frequency);
                false
            }
            Err(idx) => {
                self.postings.insert(idx, Posting::new(doc_id, frequency));
                true
            }
        }
    }

    pub fn find(&self, doc_id: DocId) -> Option<&Posting> {
        self.postings
            .binary_search_by_key(&doc_id, |p| p.doc_id)
            .ok()
            .map(|idx| &self.postings[idx])
    }

    pub fn len(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.postings.is_empty() }

    pub fn as_slice(&self) -> &[Posting] { &self.postings }

    pub fn iter(&self) -> std::slice::Iter<'_, Posting> { self.postings.iter() }

    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.postings.iter().map(|p| p.doc_id)
    }

    /// Sum of all frequencies.
    pub fn total_frequency(&self) -> u64 {
        self.postings.iter().map(|p| u64::from(p.frequency)).sum()
    }

    /// Documents present in both lists. The frequency of each result posting
    /// is the sum of the two contributing frequencies.
    pub fn intersect(&self, other: &PostingList) -> PostingList {
        let (a, b) = (&self.postings, &other.postings);
        let mut out = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].doc_id.cmp(&b[j].doc_id) {
                Ordering::Equal => {
                    let frequency = a[i].frequency.saturating_add(b[j].frequency);
                    out.push(Posting::new(a[i].doc_id, frequency));
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        PostingList { postings: out }
    }

    /// Documents present in either list. Documents found on both sides carry
    /// the sum of the two frequencies.
    pub fn union(&self, other: &PostingList) -> PostingList {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }

        let (a, b) = (&self.postings, &other.postings);
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].doc_id.cmp(&b[j].doc_id) {
                Ordering::Equal => {
                    let frequency = a[i].frequency.saturating_add(b[j].frequency);
                    out.push(Posting::new(a[i].doc_id, frequency));
                    i += 1;
                    j += 1;
                }
                Ordering::Less => {
                    out.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    out.push(b[j]);
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&a[i..]);
        out.extend_from_slice(&b[j..]);
        PostingList { postings: out }
    }

    /// Checks the ordering invariant; used on data that did not go through
    /// [`PostingList::add_with_frequency`].
    pub(crate) fn is_well_formed(&self) -> bool {
        self.postings.iter().all(|p| p.frequency >= 1)
            && self.postings.windows(2).all(|w| w[0].doc_id < w[1].doc_id)
    }
}

impl FromIterator<(DocId, u32)> for PostingList {
    fn from_iter<I: IntoIterator<Item = (DocId, u32)>>(iter: I) -> Self {
        let mut list = PostingList::new();
        for (doc_id, frequency) in iter {
            list.add_with_frequency(doc_id, frequency);
        }
        list
    }
}

impl<'a> IntoIterator for &'a PostingList {
    type Item = &'a Posting;
    type IntoIter = std::slice::Iter<'a, Posting>;

    fn into_iter(self) -> Self::IntoIter {
        self.postings.iter()
    }
}

impl fmt::Display for PostingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, p) in self.postings.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pairs(list: &PostingList) -> Vec<(DocId, u32)> {
        list.iter().map(|p| (p.doc_id, p.frequency)).collect()
    }

    #[test]
    fn add_keeps_order_and_counts_repeats() {
        let mut list = PostingList::new();
        assert!(list.add(5));
        assert!(list.add(1));
        assert!(list.add(3));
        assert!(!list.add(3));
        assert_eq!(pairs(&list), vec![(1, 1), (3, 2), (5, 1)]);
        assert_eq!(list.find(3).map(|p| p.frequency), Some(2));
        assert!(list.find(4).is_none());
    }

    #[test]
    fn batched_frequency_accumulates() {
        let mut list = PostingList::new();
        assert!(list.add_with_frequency(2, 3));
        assert!(!list.add_with_frequency(2, 4));
        assert!(!list.add_with_frequency(9, 0));
        assert_eq!(pairs(&list), vec![(2, 7)]);
        assert_eq!(list.total_frequency(), 7);
    }

    #[test]
    fn frequencies_saturate_instead_of_overflowing() {
        let mut list = PostingList::new();
        list.add_with_frequency(1, u32::MAX);
        list.add_with_frequency(1, 5);
        assert_eq!(pairs(&list), vec![(1, u32::MAX)]);

        let other: PostingList = [(1, 7)].into_iter().collect();
        assert_eq!(pairs(&list.intersect(&other)), vec![(1, u32::MAX)]);
        assert_eq!(pairs(&other.union(&list)), vec![(1, u32::MAX)]);
    }

    #[test]
    fn merge_example() {
        let a: PostingList = [(1, 2), (3, 1), (5, 4)].into_iter().collect();
        let b: PostingList = [(3, 2), (5, 1), (7, 3)].into_iter().collect();
        assert_eq!(pairs(&a.intersect(&b)), vec![(3, 3), (5, 5)]);
        assert_eq!(pairs(&a.union(&b)), vec![(1, 2), (3, 3), (5, 5), (7, 3)]);
    }

    #[test]
    fn empty_operands() {
        let a: PostingList = [(1, 2), (4, 1)].into_iter().collect();
        let empty = PostingList::new();
        assert!(a.intersect(&empty).is_empty());
        assert!(empty.intersect(&a).is_empty());
        assert_eq!(a.union(&empty), a);
        assert_eq!(empty.union(&a), a);
    }

    #[test]
    fn display_lists_pairs() {
        let a: PostingList = [(1, 2), (3, 1)].into_iter().collect();
        assert_eq!(a.to_string(), "[1:2, 3:1]");
    }

    fn arb_list() -> impl Strategy<Value = PostingList> {
        prop::collection::vec((1u32..60, 1u32..5), 0..40)
            .prop_map(|v| v.into_iter().collect::<PostingList>())
    }

    proptest! {
        #[test]
        fn lists_stay_strictly_sorted(a in arb_list(), b in arb_list()) {
            prop_assert!(a.is_well_formed());
            prop_assert!(a.intersect(&b).is_well_formed());
            prop_assert!(a.union(&b).is_well_formed());
        }

        #[test]
        fn merges_are_commutative(a in arb_list(), b in arb_list()) {
            prop_assert_eq!(a.intersect(&b), b.intersect(&a));
            prop_assert_eq!(a.union(&b), b.union(&a));
        }

        #[test]
        fn merges_match_set_semantics(a in arb_list(), b in arb_list()) {
            let inter: Vec<DocId> = a.intersect(&b).doc_ids().collect();
            let expected: Vec<DocId> = a.doc_ids().filter(|d| b.find(*d).is_some()).collect();
            prop_assert_eq!(inter, expected);

            let union = a.union(&b);
            prop_assert_eq!(union.total_frequency(), a.total_frequency() + b.total_frequency());
            for d in a.doc_ids().chain(b.doc_ids()) {
                prop_assert!(union.find(d).is_some());
            }
        }
    }
}
