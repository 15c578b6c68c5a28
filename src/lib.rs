//! A CKY parser for probabilistic context-free grammars.
//!
//! Training trees are binarized and Markov-annotated with [`annotations::annotate_tree`], rule
//! and emission probabilities are estimated from them, and sentences are parsed by filling a
//! [`Chart`] bottom-up and following backpointers from the root constituent.
//!
//! ```
//! # use cky_pcfg_parser::{Parser, ParsingConfig, grammars::TOY_TREEBANK, trees::Tree};
//! let treebank = Tree::parse_many(TOY_TREEBANK)?;
//! let parser = Parser::train(&treebank, ParsingConfig::default())?;
//! let tree = parser.parse(&["the", "dog", "saw", "a", "cat", "."])?.unwrap();
//! assert_eq!(
//!     tree.to_string(),
//!     "(ROOT (S (NP (DT the) (NN dog)) (VP (VBD saw) (NP (DT a) (NN cat))) (. .)))"
//! );
//! # Ok::<(), cky_pcfg_parser::ParsingError>(())
//! ```
use logprob::LogProb;
use thiserror::Error;
use tracing::debug;

use annotations::{Markovization, annotate_tree, unannotate_tree};
use grammar::{Grammar, RuleSet};
use lexicon::{Lexicon, TreebankLexicon};
use parsing::CkyEngine;
use tree_building::build_tree;
use trees::Tree;

pub use parsing::chart::{Backpointer, Chart, Constituent, DerivationEntry};

///The label of the constituent a full parse must be rooted in, unless configured otherwise.
pub const DEFAULT_ROOT_LABEL: &str = "ROOT";

///How many rounds of unary promotion a single span may take before giving up.
pub const DEFAULT_MAX_UNARY_ROUNDS: usize = 256;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParsingError {
    #[error("{0} is not a valid probability")]
    InvalidProbability(f64),
    #[error("A vertical Markov order of {vertical} is invalid, it must be at least 1")]
    InvalidMarkovization { vertical: usize },
    #[error("Unary closure over {start}..{end} did not converge after {rounds} rounds")]
    UnaryClosureDiverged {
        start: usize,
        end: usize,
        rounds: usize,
    },
    #[error("Malformed tree: {0}")]
    MalformedTree(String),
    #[error("Cannot train on an empty treebank")]
    EmptyTreebank,
}

///Which side of a binary rule a child sits on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingConfig {
    pub root_label: String,
    pub markovization: Markovization,
    pub max_unary_rounds: usize,
}

impl ParsingConfig {
    pub fn new(root_label: impl Into<String>, markovization: Markovization) -> Self {
        ParsingConfig {
            root_label: root_label.into(),
            markovization,
            max_unary_rounds: DEFAULT_MAX_UNARY_ROUNDS,
        }
    }

    pub fn with_max_unary_rounds(mut self, max_unary_rounds: usize) -> Self {
        self.max_unary_rounds = max_unary_rounds;
        self
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        ParsingConfig::new(DEFAULT_ROOT_LABEL, Markovization::default())
    }
}

///Converts a raw probability to log space, rejecting anything outside of `[0, 1]`.
pub(crate) fn log_prob_of(p: f64) -> Result<LogProb<f64>, ParsingError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ParsingError::InvalidProbability(p));
    }
    LogProb::from_raw_prob(p).map_err(|_| ParsingError::InvalidProbability(p))
}

///A parser over a fixed grammar and lexicon. Both are only ever read, so a single parser can be
///shared between threads and used to parse many sentences at once.
#[derive(Debug, Clone)]
pub struct Parser<G, L> {
    grammar: G,
    lexicon: L,
    config: ParsingConfig,
}

impl<G: Grammar, L: Lexicon> Parser<G, L> {
    pub fn new(grammar: G, lexicon: L, config: ParsingConfig) -> Self {
        Parser {
            grammar,
            lexicon,
            config,
        }
    }

    pub fn grammar(&self) -> &G {
        &self.grammar
    }

    pub fn lexicon(&self) -> &L {
        &self.lexicon
    }

    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    ///Fills a fresh chart for `sentence`.
    pub fn fill_chart(&self, sentence: &[&str]) -> Result<Chart, ParsingError> {
        CkyEngine::new(&self.grammar, &self.lexicon, &self.config).fill(sentence)
    }

    ///Finds the most probable tree rooted in the configured root label along with its log
    ///probability, or [`None`] if the sentence has no such parse.
    pub fn parse_with_score(
        &self,
        sentence: &[&str],
    ) -> Result<Option<(Tree, LogProb<f64>)>, ParsingError> {
        let chart = self.fill_chart(sentence)?;
        debug!(
            words = sentence.len(),
            entries = chart.len(),
            "Filled chart"
        );

        let root = Constituent::new(self.config.root_label.as_str(), 0, sentence.len());
        let Some(log_prob) = chart.log_prob(&root) else {
            debug!(words = sentence.len(), "No parse");
            return Ok(None);
        };

        let derivation = build_tree(&chart, &root);
        debug!(log_prob = log_prob.into_inner(), "Found parse");
        Ok(Some((unannotate_tree(&derivation), log_prob)))
    }

    ///Finds the most probable tree rooted in the configured root label, or [`None`] if the
    ///sentence has no such parse.
    pub fn parse(&self, sentence: &[&str]) -> Result<Option<Tree>, ParsingError> {
        Ok(self.parse_with_score(sentence)?.map(|(tree, _)| tree))
    }
}

impl Parser<RuleSet, TreebankLexicon> {
    ///Annotates `trees` according to `config` and estimates a grammar and lexicon from them.
    pub fn train(trees: &[Tree], config: ParsingConfig) -> Result<Self, ParsingError> {
        if trees.is_empty() {
            return Err(ParsingError::EmptyTreebank);
        }
        let annotated = trees
            .iter()
            .map(|tree| annotate_tree(tree, &config.markovization))
            .collect::<Result<Vec<_>, _>>()?;

        let grammar = RuleSet::from_trees(&annotated)?;
        let lexicon = TreebankLexicon::from_trees(&annotated);
        debug!(
            trees = trees.len(),
            unary_rules = grammar.n_unary_rules(),
            binary_rules = grammar.n_binary_rules(),
            tags = lexicon.all_tags().len(),
            "Trained parser"
        );
        Ok(Parser::new(grammar, lexicon, config))
    }
}

pub mod annotations;
pub mod grammar;
pub mod grammars;
pub mod lexicon;
mod parsing;
pub mod tree_building;
pub mod trees;
