//! Binarization and Markovization of trees, and the inverse transformation applied to parser
//! output.
//!
//! A node `X` with three or more children is rewritten into a right branching chain of synthetic
//! nodes, each labelled with `@X->` followed by the children generated so far:
//! `(S (NP a) (VP b) (PP c))` becomes `(S (NP a) (@S->_NP (VP b) (PP c)))`.
use itertools::Itertools;

use crate::ParsingError;
use crate::trees::Tree;

///Marks a node introduced by binarization.
pub const SYNTHETIC_PREFIX: char = '@';
///Separates a label from the labels of its ancestors.
pub const VERTICAL_SEPARATOR: char = '^';

const HISTORY_SEPARATOR: char = '_';
const TRUNCATED_HISTORY: &str = "...";

///How much context is folded into labels when annotating a tree.
///
///`vertical` is the order of the vertical Markov process: 1 leaves labels alone, 2 adds the
///parent label, 3 the parent and grandparent, and so on. `horizontal` bounds how many preceding
///siblings a synthetic label remembers; [`None`] keeps all of them, which makes binarization
///lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Markovization {
    pub vertical: usize,
    pub horizontal: Option<usize>,
}

impl Default for Markovization {
    fn default() -> Self {
        Markovization {
            vertical: 1,
            horizontal: None,
        }
    }
}

impl Markovization {
    pub fn new(vertical: usize, horizontal: Option<usize>) -> Result<Self, ParsingError> {
        let markovization = Markovization {
            vertical,
            horizontal,
        };
        markovization.validate()?;
        Ok(markovization)
    }

    fn validate(&self) -> Result<(), ParsingError> {
        if self.vertical == 0 {
            Err(ParsingError::InvalidMarkovization {
                vertical: self.vertical,
            })
        } else {
            Ok(())
        }
    }
}

///Binarizes and annotates a training tree according to `markovization`.
pub fn annotate_tree(tree: &Tree, markovization: &Markovization) -> Result<Tree, ParsingError> {
    markovization.validate()?;
    Ok(annotate(tree, &[], markovization))
}

fn annotate(tree: &Tree, ancestors: &[&str], markovization: &Markovization) -> Tree {
    if tree.is_leaf() {
        return tree.clone();
    }

    let label = std::iter::once(tree.label())
        .chain(ancestors.iter().take(markovization.vertical - 1).copied())
        .join(&VERTICAL_SEPARATOR.to_string());

    let child_ancestors: Vec<&str> = std::iter::once(tree.label())
        .chain(ancestors.iter().copied())
        .take(markovization.vertical.saturating_sub(1))
        .collect();

    let children: Vec<Tree> = tree
        .children()
        .iter()
        .map(|child| annotate(child, &child_ancestors, markovization))
        .collect();

    if children.len() <= 2 {
        Tree::new(label, children)
    } else {
        let history: Vec<&str> = tree.children().iter().map(Tree::label).collect();
        let children = binarize(&label, children, &history, markovization.horizontal);
        Tree::new(label, children)
    }
}

///Turns `children` (at least three) into the two children of a right branching chain.
fn binarize(
    parent: &str,
    mut children: Vec<Tree>,
    history: &[&str],
    horizontal: Option<usize>,
) -> Vec<Tree> {
    let n = children.len();
    let last_two = children.split_off(n - 2);
    let tail = Tree::new(
        synthetic_label(parent, &history[..n - 2], horizontal),
        last_two,
    );

    let middle = children.split_off(1);
    let tail = middle
        .into_iter()
        .enumerate()
        .rev()
        .fold(tail, |tail, (i, child)| {
            Tree::new(
                synthetic_label(parent, &history[..=i], horizontal),
                vec![child, tail],
            )
        });

    children.push(tail);
    children
}

fn synthetic_label(parent: &str, history: &[&str], horizontal: Option<usize>) -> String {
    let kept = match horizontal {
        Some(h) if history.len() > h => &history[history.len() - h..],
        _ => history,
    };
    let truncated = if kept.len() < history.len() {
        TRUNCATED_HISTORY
    } else {
        ""
    };
    format!(
        "{SYNTHETIC_PREFIX}{parent}->{truncated}{}",
        kept.iter()
            .map(|label| format!("{HISTORY_SEPARATOR}{label}"))
            .join("")
    )
}

///Whether this node was introduced by binarization.
pub fn is_synthetic(tree: &Tree) -> bool {
    !tree.is_leaf() && tree.label().starts_with(SYNTHETIC_PREFIX)
}

///Undoes [`annotate_tree`]: splices out synthetic nodes and strips vertical annotations and
///function tags from every remaining label. Words are never altered.
pub fn unannotate_tree(tree: &Tree) -> Tree {
    strip_labels(splice_synthetic(tree))
}

fn splice_synthetic(tree: &Tree) -> Tree {
    if tree.is_leaf() {
        return tree.clone();
    }
    let mut children = Vec::with_capacity(tree.children().len());
    for child in tree.children() {
        //Children are spliced first, so a synthetic child only holds real nodes by now.
        let child = splice_synthetic(child);
        if is_synthetic(&child) {
            children.extend(child.into_parts().1);
        } else {
            children.push(child);
        }
    }
    Tree::new(tree.label(), children)
}

fn strip_labels(tree: Tree) -> Tree {
    if tree.is_leaf() {
        return tree;
    }
    let (label, children) = tree.into_parts();
    Tree::new(
        base_label(&label),
        children.into_iter().map(strip_labels).collect(),
    )
}

///Strips vertical annotations (`NP^S`) and function tags (`NP-SBJ`, `NP=2`) from a label.
///Labels starting with the separator, like `-NONE-`, are kept as they are.
pub fn base_label(label: &str) -> &str {
    let label = cut_at(label, |c| c == VERTICAL_SEPARATOR);
    cut_at(label, |c| c == '-' || c == '=')
}

fn cut_at(label: &str, pattern: impl Fn(char) -> bool) -> &str {
    match label.find(pattern) {
        Some(i) if i > 0 => &label[..i],
        _ => label,
    }
}
