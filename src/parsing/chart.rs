//! The CKY chart: the best derivation found so far for each labelled span, and an index of which
//! labels have been found over each span.
use std::collections::BTreeSet;
use std::fmt::Display;

use ahash::HashMap;
use logprob::LogProb;

///A label over the half-open span `start..end` of a sentence. Words are represented as
///constituents over the empty span `i..i`, and never appear in a [`Chart`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Constituent {
    pub label: String,
    pub start: usize,
    pub end: usize,
}

impl Constituent {
    pub fn new(label: impl Into<String>, start: usize, end: usize) -> Self {
        Constituent {
            label: label.into(),
            start,
            end,
        }
    }

    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    pub fn is_word(&self) -> bool {
        self.start == self.end
    }
}

impl Display for Constituent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}..{}]", self.label, self.start, self.end)
    }
}

///How a constituent was built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Backpointer {
    ///A tag over the word it produces.
    Terminal(Constituent),
    Unary(Constituent),
    Binary(Constituent, Constituent),
}

impl Backpointer {
    pub fn children(&self) -> impl Iterator<Item = &Constituent> {
        let (first, second) = match self {
            Backpointer::Terminal(child) | Backpointer::Unary(child) => (child, None),
            Backpointer::Binary(left, right) => (left, Some(right)),
        };
        std::iter::once(first).chain(second)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivationEntry {
    pub log_prob: LogProb<f64>,
    pub backpointer: Backpointer,
}

#[derive(Debug, Clone, Default)]
pub struct Chart {
    entries: HashMap<Constituent, DerivationEntry>,
    seen: HashMap<(usize, usize), BTreeSet<String>>,
}

impl Chart {
    pub fn new() -> Self {
        Chart::default()
    }

    pub fn get(&self, constituent: &Constituent) -> Option<&DerivationEntry> {
        self.entries.get(constituent)
    }

    pub fn log_prob(&self, constituent: &Constituent) -> Option<LogProb<f64>> {
        self.get(constituent).map(|entry| entry.log_prob)
    }

    ///The labels found over `start..end`, in sorted order.
    pub fn seen(&self, start: usize, end: usize) -> Option<&BTreeSet<String>> {
        self.seen.get(&(start, end))
    }

    pub fn n_seen(&self, start: usize, end: usize) -> usize {
        self.seen(start, end).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Constituent, &DerivationEntry)> {
        self.entries.iter()
    }

    ///Records a derivation of `constituent` if it is strictly better than the current one,
    ///returning whether it was recorded. Ties keep the derivation found first.
    pub fn improve(
        &mut self,
        constituent: Constituent,
        log_prob: LogProb<f64>,
        backpointer: Backpointer,
    ) -> bool {
        debug_assert!(constituent.start < constituent.end);
        if let Some(entry) = self.entries.get(&constituent) {
            if entry.log_prob >= log_prob {
                return false;
            }
        }
        self.seen
            .entry(constituent.span())
            .or_default()
            .insert(constituent.label.clone());
        self.entries.insert(
            constituent,
            DerivationEntry {
                log_prob,
                backpointer,
            },
        );
        true
    }

    ///Checks that a label is indexed over a span exactly when the chart has an entry for it.
    pub fn is_consistent(&self) -> bool {
        let n_indexed: usize = self.seen.values().map(BTreeSet::len).sum();
        n_indexed == self.entries.len()
            && self.entries.keys().all(|constituent| {
                self.seen(constituent.start, constituent.end)
                    .is_some_and(|labels| labels.contains(&constituent.label))
            })
    }
}
