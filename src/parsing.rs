//! Module to define the CKY algorithm used to fill a chart bottom-up from the words of a sentence
use std::collections::BTreeSet;

use tracing::{trace, warn};

use crate::grammar::Grammar;
use crate::lexicon::Lexicon;
use crate::{Direction, ParsingConfig, ParsingError, log_prob_of};
use chart::{Backpointer, Chart, Constituent};

pub mod chart;

///Fills a single chart. Scores only ever combine in log space, and a chart entry is only
///replaced by a strictly better derivation, so ties go to whichever derivation is found first.
pub(crate) struct CkyEngine<'a, G, L> {
    grammar: &'a G,
    lexicon: &'a L,
    config: &'a ParsingConfig,
    chart: Chart,
}

impl<'a, G: Grammar, L: Lexicon> CkyEngine<'a, G, L> {
    pub(crate) fn new(grammar: &'a G, lexicon: &'a L, config: &'a ParsingConfig) -> Self {
        CkyEngine {
            grammar,
            lexicon,
            config,
            chart: Chart::new(),
        }
    }

    pub(crate) fn fill(mut self, sentence: &[&str]) -> Result<Chart, ParsingError> {
        let n = sentence.len();
        for (i, word) in sentence.iter().enumerate() {
            self.score_preterminals(word, i)?;
            self.unary_closure(i, i + 1, true)?;
            trace!(word, tags = self.chart.n_seen(i, i + 1), "Scored word");
        }

        for width in 2..=n {
            for start in 0..=(n - width) {
                let end = start + width;
                self.binary_combination(start, end);
                self.unary_closure(start, end, false)?;
                trace!(start, end, labels = self.chart.n_seen(start, end), "Filled span");
            }
        }
        Ok(self.chart)
    }

    fn score_preterminals(&mut self, word: &str, i: usize) -> Result<(), ParsingError> {
        let lexicon = self.lexicon;
        for tag in lexicon.all_tags() {
            let p = lexicon.score_tagging(word, tag);
            if p == 0.0 {
                continue;
            }
            self.chart.improve(
                Constituent::new(tag.as_str(), i, i + 1),
                log_prob_of(p)?,
                Backpointer::Terminal(Constituent::new(word, i, i)),
            );
        }
        Ok(())
    }

    ///Promotes constituents over `start..end` through unary rules until nothing improves. Each
    ///round only revisits the labels that improved in the round before it.
    fn unary_closure(
        &mut self,
        start: usize,
        end: usize,
        only_scored: bool,
    ) -> Result<(), ParsingError> {
        let grammar = self.grammar;
        let mut agenda: BTreeSet<String> = self.chart.seen(start, end).cloned().unwrap_or_default();
        let mut rounds = 0;

        while !agenda.is_empty() {
            if rounds == self.config.max_unary_rounds {
                warn!(start, end, rounds, "Unary closure did not converge");
                return Err(ParsingError::UnaryClosureDiverged { start, end, rounds });
            }
            rounds += 1;

            let mut improved = BTreeSet::new();
            for label in agenda {
                let child = Constituent::new(label, start, end);
                let Some(child_prob) = self.chart.log_prob(&child) else {
                    continue;
                };
                if only_scored && !child_prob.into_inner().is_finite() {
                    continue;
                }
                for rule in grammar.unary_rules_by_child(&child.label) {
                    if self.chart.improve(
                        Constituent::new(rule.parent.as_str(), start, end),
                        child_prob + rule.log_prob,
                        Backpointer::Unary(child.clone()),
                    ) {
                        improved.insert(rule.parent.clone());
                    }
                }
            }
            agenda = improved;
        }
        Ok(())
    }

    ///Combines every pair of adjacent constituents covering `start..end`. For each split point,
    ///rules are looked up from whichever side has fewer labels.
    fn binary_combination(&mut self, start: usize, end: usize) {
        let grammar = self.grammar;
        for split in (start + 1)..end {
            let (Some(left_labels), Some(right_labels)) = (
                self.chart.seen(start, split).cloned(),
                self.chart.seen(split, end).cloned(),
            ) else {
                continue;
            };

            let direction = if right_labels.len() < left_labels.len() {
                Direction::Right
            } else {
                Direction::Left
            };
            let (labels, others) = match direction {
                Direction::Left => (&left_labels, &right_labels),
                Direction::Right => (&right_labels, &left_labels),
            };

            for label in labels {
                let rules = match direction {
                    Direction::Left => grammar.binary_rules_by_left_child(label),
                    Direction::Right => grammar.binary_rules_by_right_child(label),
                };
                for rule in rules {
                    let other = match direction {
                        Direction::Left => &rule.right,
                        Direction::Right => &rule.left,
                    };
                    if !others.contains(other) {
                        continue;
                    }

                    let left = Constituent::new(rule.left.as_str(), start, split);
                    let right = Constituent::new(rule.right.as_str(), split, end);
                    let (Some(left_prob), Some(right_prob)) =
                        (self.chart.log_prob(&left), self.chart.log_prob(&right))
                    else {
                        continue;
                    };
                    self.chart.improve(
                        Constituent::new(rule.parent.as_str(), start, end),
                        left_prob + right_prob + rule.log_prob,
                        Backpointer::Binary(left, right),
                    );
                }
            }
        }
    }
}
