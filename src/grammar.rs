//! Unary and binary rules, and the lookups the parser needs to combine constituents with them.
use std::fmt::Display;

use ahash::HashMap;
use itertools::Itertools;
use logprob::LogProb;
use tracing::warn;

use crate::{ParsingError, log_prob_of, trees::Tree};

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryRule {
    pub parent: String,
    pub child: String,
    pub log_prob: LogProb<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryRule {
    pub parent: String,
    pub left: String,
    pub right: String,
    pub log_prob: LogProb<f64>,
}

impl Display for UnaryRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} ({})",
            self.parent,
            self.child,
            self.log_prob.into_inner()
        )
    }
}

impl Display for BinaryRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} {} ({})",
            self.parent,
            self.left,
            self.right,
            self.log_prob.into_inner()
        )
    }
}

///The rule lookups the CKY engine relies on. Unknown labels have no rules, and the order rules
///are returned in is the order in which they are tried.
pub trait Grammar {
    fn unary_rules_by_child(&self, child: &str) -> &[UnaryRule];
    fn binary_rules_by_left_child(&self, left: &str) -> &[BinaryRule];
    fn binary_rules_by_right_child(&self, right: &str) -> &[BinaryRule];
}

///A grammar stored as rules indexed by their children.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    unary_by_child: HashMap<String, Vec<UnaryRule>>,
    binary_by_left: HashMap<String, Vec<BinaryRule>>,
    binary_by_right: HashMap<String, Vec<BinaryRule>>,
    n_unary: usize,
    n_binary: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum RightHandSide {
    Unary(String),
    Binary(String, String),
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet::default()
    }

    ///Adds `parent -> child` with probability `prob`. Rules with zero probability can never be
    ///used and are dropped.
    pub fn add_unary(
        &mut self,
        parent: impl Into<String>,
        child: impl Into<String>,
        prob: f64,
    ) -> Result<(), ParsingError> {
        if prob == 0.0 {
            return Ok(());
        }
        let log_prob = log_prob_of(prob)?;
        let rule = UnaryRule {
            parent: parent.into(),
            child: child.into(),
            log_prob,
        };
        self.unary_by_child
            .entry(rule.child.clone())
            .or_default()
            .push(rule);
        self.n_unary += 1;
        Ok(())
    }

    ///Adds `parent -> left right` with probability `prob`. Rules with zero probability can never
    ///be used and are dropped.
    pub fn add_binary(
        &mut self,
        parent: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
        prob: f64,
    ) -> Result<(), ParsingError> {
        if prob == 0.0 {
            return Ok(());
        }
        let log_prob = log_prob_of(prob)?;
        let rule = BinaryRule {
            parent: parent.into(),
            left: left.into(),
            right: right.into(),
            log_prob,
        };
        self.binary_by_right
            .entry(rule.right.clone())
            .or_default()
            .push(rule.clone());
        self.binary_by_left
            .entry(rule.left.clone())
            .or_default()
            .push(rule);
        self.n_binary += 1;
        Ok(())
    }

    ///Estimates rule probabilities by relative frequency, `count(X -> α) / count(X)`, over every
    ///local tree which is neither a word nor a tag. Trees should already be binarized; wider
    ///nodes are skipped.
    pub fn from_trees(trees: &[Tree]) -> Result<Self, ParsingError> {
        let mut rule_counts: HashMap<(String, RightHandSide), usize> = HashMap::default();
        let mut parent_counts: HashMap<String, usize> = HashMap::default();
        for tree in trees {
            count_rules(tree, &mut rule_counts, &mut parent_counts);
        }

        let mut rules = RuleSet::new();
        for ((parent, rhs), count) in rule_counts.into_iter().sorted() {
            let prob = count as f64 / parent_counts[&parent] as f64;
            match rhs {
                RightHandSide::Unary(child) => rules.add_unary(parent, child, prob)?,
                RightHandSide::Binary(left, right) => rules.add_binary(parent, left, right, prob)?,
            }
        }
        Ok(rules)
    }

    pub fn n_unary_rules(&self) -> usize {
        self.n_unary
    }

    pub fn n_binary_rules(&self) -> usize {
        self.n_binary
    }

    pub fn unary_rules(&self) -> impl Iterator<Item = &UnaryRule> {
        self.unary_by_child.values().flatten()
    }

    pub fn binary_rules(&self) -> impl Iterator<Item = &BinaryRule> {
        self.binary_by_left.values().flatten()
    }
}

fn count_rules(
    tree: &Tree,
    rule_counts: &mut HashMap<(String, RightHandSide), usize>,
    parent_counts: &mut HashMap<String, usize>,
) {
    if tree.is_leaf() || tree.is_preterminal() {
        return;
    }
    let rhs = match tree.children() {
        [child] => Some(RightHandSide::Unary(child.label().to_string())),
        [left, right] => Some(RightHandSide::Binary(
            left.label().to_string(),
            right.label().to_string(),
        )),
        children => {
            warn!(
                label = tree.label(),
                arity = children.len(),
                "Skipping node that is not binarized"
            );
            None
        }
    };
    if let Some(rhs) = rhs {
        *rule_counts
            .entry((tree.label().to_string(), rhs))
            .or_default() += 1;
        *parent_counts.entry(tree.label().to_string()).or_default() += 1;
    }
    for child in tree.children() {
        count_rules(child, rule_counts, parent_counts);
    }
}

impl Grammar for RuleSet {
    fn unary_rules_by_child(&self, child: &str) -> &[UnaryRule] {
        self.unary_by_child
            .get(child)
            .map(|rules| rules.as_slice())
            .unwrap_or_default()
    }

    fn binary_rules_by_left_child(&self, left: &str) -> &[BinaryRule] {
        self.binary_by_left
            .get(left)
            .map(|rules| rules.as_slice())
            .unwrap_or_default()
    }

    fn binary_rules_by_right_child(&self, right: &str) -> &[BinaryRule] {
        self.binary_by_right
            .get(right)
            .map(|rules| rules.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use approx::assert_relative_eq;

    #[test]
    fn relative_frequencies() -> Result<()> {
        let trees = Tree::parse_many(
            "(ROOT (NP (DT the) (NN dog)))
             (ROOT (NP (DT a) (NN cat)))
             (ROOT (NP (NN cats)))
             (ROOT (VP (VB run)))",
        )?;
        let rules = RuleSet::from_trees(&trees)?;
        assert_eq!(rules.n_binary_rules(), 1);
        assert_eq!(rules.n_unary_rules(), 4);

        let [np] = rules.binary_rules_by_left_child("DT") else {
            panic!("Expected exactly one rule headed by DT");
        };
        assert_eq!((np.parent.as_str(), np.right.as_str()), ("NP", "NN"));
        assert_relative_eq!(np.log_prob.into_inner(), (2.0f64 / 3.0).ln());
        assert!(np.to_string().starts_with("NP -> DT NN ("));

        let by_child: HashMap<_, _> = rules
            .unary_rules()
            .map(|rule| ((rule.parent.as_str(), rule.child.as_str()), rule.log_prob))
            .collect();
        assert_relative_eq!(by_child[&("ROOT", "NP")].into_inner(), 0.75f64.ln());
        assert_relative_eq!(by_child[&("ROOT", "VP")].into_inner(), 0.25f64.ln());
        assert_relative_eq!(by_child[&("NP", "NN")].into_inner(), (1.0f64 / 3.0).ln());
        Ok(())
    }

    #[test]
    fn rules_sum_to_one_per_parent() -> Result<()> {
        let trees = Tree::parse_many(crate::grammars::TOY_TREEBANK)?;
        let annotated = trees
            .iter()
            .map(|t| crate::annotations::annotate_tree(t, &Default::default()))
            .collect::<Result<Vec<_>, _>>()?;
        let rules = RuleSet::from_trees(&annotated)?;

        let mut totals: HashMap<&str, f64> = HashMap::default();
        for rule in rules.unary_rules() {
            *totals.entry(&rule.parent).or_default() += rule.log_prob.into_inner().exp();
        }
        for rule in rules.binary_rules() {
            *totals.entry(&rule.parent).or_default() += rule.log_prob.into_inner().exp();
        }
        assert!(!totals.is_empty());
        for total in totals.values() {
            assert_relative_eq!(*total, 1.0, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn lookups() -> Result<()> {
        let mut rules = RuleSet::new();
        rules.add_binary("S", "NP", "VP", 0.9)?;
        rules.add_binary("S", "VP", "NP", 0.1)?;
        rules.add_unary("NP", "NN", 0.5)?;
        rules.add_unary("NP", "PRP", 0.0)?;

        assert_eq!(rules.binary_rules_by_left_child("NP").len(), 1);
        assert_eq!(rules.binary_rules_by_left_child("NP")[0].right, "VP");
        assert_eq!(rules.binary_rules_by_right_child("NP")[0].left, "VP");
        assert_eq!(rules.unary_rules_by_child("NN")[0].parent, "NP");
        assert!(rules.unary_rules_by_child("PRP").is_empty());
        assert!(rules.binary_rules_by_right_child("unknown").is_empty());
        assert_eq!(rules.n_unary_rules(), 1);
        Ok(())
    }

    #[test]
    fn invalid_probabilities() {
        let mut rules = RuleSet::new();
        assert_eq!(
            rules.add_unary("NP", "NN", 1.5),
            Err(ParsingError::InvalidProbability(1.5))
        );
        assert_eq!(
            rules.add_binary("S", "NP", "VP", -0.1),
            Err(ParsingError::InvalidProbability(-0.1))
        );
        assert!(rules.add_unary("NP", "NN", f64::NAN).is_err());
        assert_eq!(rules.n_unary_rules() + rules.n_binary_rules(), 0);
    }
}
