//! Owned, labelled trees and their bracketed notation, e.g. `(ROOT (NP (DT the) (NN dog)))`.
use std::fmt::Display;
use std::str::FromStr;

use chumsky::prelude::*;
use itertools::Itertools;

use crate::ParsingError;

///A labelled tree. Words are leaves; every other node is a tag or phrase label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tree {
    label: String,
    children: Vec<Tree>,
}

impl Tree {
    pub fn new(label: impl Into<String>, children: Vec<Tree>) -> Self {
        Tree {
            label: label.into(),
            children,
        }
    }

    pub fn leaf(label: impl Into<String>) -> Self {
        Tree::new(label, vec![])
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn children(&self) -> &[Tree] {
        &self.children
    }

    pub fn into_parts(self) -> (String, Vec<Tree>) {
        (self.label, self.children)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    ///A preterminal is a tag sitting directly above a single word.
    pub fn is_preterminal(&self) -> bool {
        matches!(self.children.as_slice(), [child] if child.is_leaf())
    }

    ///The words of the tree, left to right.
    pub fn words(&self) -> Vec<&str> {
        let mut words = vec![];
        self.collect_words(&mut words);
        words
    }

    fn collect_words<'a>(&'a self, words: &mut Vec<&'a str>) {
        if self.is_leaf() {
            words.push(&self.label);
        } else {
            for child in self.children.iter() {
                child.collect_words(words);
            }
        }
    }

    ///Parses a single tree in bracketed notation. Leading and trailing whitespace is ignored.
    pub fn parse(s: &str) -> Result<Self, ParsingError> {
        tree_parser()
            .then_ignore(end())
            .parse(s)
            .into_result()
            .map_err(|errors| {
                ParsingError::MalformedTree(errors.into_iter().map(|e| e.to_string()).join("\n"))
            })
    }

    ///Parses a whitespace separated sequence of bracketed trees.
    pub fn parse_many(s: &str) -> Result<Vec<Self>, ParsingError> {
        tree_parser()
            .repeated()
            .collect::<Vec<_>>()
            .then_ignore(end())
            .parse(s)
            .into_result()
            .map_err(|errors| {
                ParsingError::MalformedTree(errors.into_iter().map(|e| e.to_string()).join("\n"))
            })
    }
}

fn tree_parser<'src>() -> impl Parser<'src, &'src str, Tree, extra::Err<Rich<'src, char>>> {
    recursive(|tree| {
        let label = none_of(['(', ')', ' ', '\t', '\r', '\n'])
            .repeated()
            .at_least(1)
            .to_slice()
            .map(|s: &str| s.to_string())
            .labelled("label");

        let branch = just('(')
            .ignore_then(label.clone().padded())
            .then(tree.padded().repeated().at_least(1).collect::<Vec<_>>())
            .then_ignore(just(')'))
            .map(|(label, children)| Tree::new(label, children))
            .labelled("bracketed tree");

        branch.or(label.map(Tree::leaf))
    })
    .padded()
}

impl FromStr for Tree {
    type Err = ParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tree::parse(s)
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_leaf() {
            return write!(f, "{}", self.label);
        }
        write!(f, "({}", self.label)?;
        for child in self.children.iter() {
            write!(f, " {}", child)?;
        }
        write!(f, ")")
    }
}
