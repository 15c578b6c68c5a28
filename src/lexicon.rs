//! Tagging scores: how likely a preterminal tag is to produce a given word.
use std::collections::BTreeSet;

use ahash::HashMap;

use crate::trees::Tree;

///How much probability mass an unseen word receives relative to the tag distribution of words
///seen exactly once.
pub const UNKNOWN_WORD_WEIGHT: f64 = 1e-3;

///Scores the tagging of words. The CKY engine tries every tag in [`Lexicon::all_tags`] for every
///word, in that order, and skips any tag whose score is zero.
pub trait Lexicon {
    ///The probability of `word` given `tag`, in `[0, 1]`.
    fn score_tagging(&self, word: &str, tag: &str) -> f64;

    fn all_tags(&self) -> &[String];
}

///A lexicon estimated from the preterminals of a treebank.
///
///Known words are scored by relative frequency, `count(tag, word) / count(tag)`. Unknown words
///may fall back to the tag distribution of hapax legomena, scaled by [`UNKNOWN_WORD_WEIGHT`].
#[derive(Debug, Clone)]
pub struct TreebankLexicon {
    tags: Vec<String>,
    tag_counts: HashMap<String, f64>,
    word_tag_counts: HashMap<String, HashMap<String, f64>>,
    unknown_tag_distribution: HashMap<String, f64>,
    open_class_fallback: bool,
}

impl TreebankLexicon {
    pub fn from_trees(trees: &[Tree]) -> Self {
        let mut tag_counts: HashMap<String, f64> = HashMap::default();
        let mut word_tag_counts: HashMap<String, HashMap<String, f64>> = HashMap::default();
        for tree in trees {
            for (tag, word) in preterminals(tree) {
                *tag_counts.entry(tag.to_string()).or_default() += 1.0;
                *word_tag_counts
                    .entry(word.to_string())
                    .or_default()
                    .entry(tag.to_string())
                    .or_default() += 1.0;
            }
        }

        let mut hapax_tag_counts: HashMap<String, f64> = HashMap::default();
        for tags in word_tag_counts.values() {
            if tags.values().sum::<f64>() == 1.0 {
                for tag in tags.keys() {
                    *hapax_tag_counts.entry(tag.clone()).or_default() += 1.0;
                }
            }
        }
        // Without any hapaxes, unknown words are tagged like any other word.
        let reference = if hapax_tag_counts.is_empty() {
            &tag_counts
        } else {
            &hapax_tag_counts
        };
        let total: f64 = reference.values().sum();
        let unknown_tag_distribution = reference
            .iter()
            .map(|(tag, count)| (tag.clone(), count / total))
            .collect();

        let tags: BTreeSet<_> = tag_counts.keys().cloned().collect();
        TreebankLexicon {
            tags: tags.into_iter().collect(),
            tag_counts,
            word_tag_counts,
            unknown_tag_distribution,
            open_class_fallback: true,
        }
    }

    ///Whether unknown words get any probability at all. With the fallback off, a sentence with an
    ///unknown word has no parse.
    pub fn with_open_class_fallback(mut self, open_class_fallback: bool) -> Self {
        self.open_class_fallback = open_class_fallback;
        self
    }

    pub fn is_known(&self, word: &str) -> bool {
        self.word_tag_counts.contains_key(word)
    }

    pub fn n_words(&self) -> usize {
        self.word_tag_counts.len()
    }
}

fn preterminals(tree: &Tree) -> Vec<(&str, &str)> {
    let mut stack = vec![tree];
    let mut found = vec![];
    while let Some(node) = stack.pop() {
        if node.is_preterminal() {
            found.push((node.label(), node.children()[0].label()));
        } else {
            stack.extend(node.children().iter().rev());
        }
    }
    found
}

impl Lexicon for TreebankLexicon {
    fn score_tagging(&self, word: &str, tag: &str) -> f64 {
        let Some(tag_count) = self.tag_counts.get(tag) else {
            return 0.0;
        };
        let score = match self.word_tag_counts.get(word) {
            Some(tags) => tags.get(tag).map(|count| count / tag_count).unwrap_or(0.0),
            None if self.open_class_fallback => {
                UNKNOWN_WORD_WEIGHT
                    * self
                        .unknown_tag_distribution
                        .get(tag)
                        .copied()
                        .unwrap_or(0.0)
            }
            None => 0.0,
        };
        score.clamp(0.0, 1.0)
    }

    fn all_tags(&self) -> &[String] {
        &self.tags
    }
}
