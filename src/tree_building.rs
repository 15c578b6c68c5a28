//! Rebuilding trees from the backpointers of a filled [`Chart`].
use crate::parsing::chart::{Backpointer, Chart, Constituent};
use crate::trees::Tree;

///Builds the best derivation of `constituent` recorded in `chart`. Constituents missing from the
///chart, which includes every word, become leaves.
///
///The tree still carries whatever annotation the grammar's labels have; see
///[`crate::annotations::unannotate_tree`].
pub fn build_tree(chart: &Chart, constituent: &Constituent) -> Tree {
    let children = match chart.get(constituent).map(|entry| &entry.backpointer) {
        None => return Tree::leaf(constituent.label.as_str()),
        Some(Backpointer::Terminal(child)) | Some(Backpointer::Unary(child)) => {
            vec![build_tree(chart, child)]
        }
        Some(Backpointer::Binary(left, right)) => {
            vec![build_tree(chart, left), build_tree(chart, right)]
        }
    };
    Tree::new(constituent.label.as_str(), children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use logprob::LogProb;

    #[test]
    fn follows_backpointers() -> Result<()> {
        let mut chart = Chart::new();
        let p = LogProb::from_raw_prob(0.5)?;
        let dt = Constituent::new("DT", 0, 1);
        let nn = Constituent::new("NN", 1, 2);
        let np = Constituent::new("NP", 0, 2);
        let root = Constituent::new("ROOT", 0, 2);
        chart.improve(
            dt.clone(),
            p,
            Backpointer::Terminal(Constituent::new("the", 0, 0)),
        );
        chart.improve(
            nn.clone(),
            p,
            Backpointer::Terminal(Constituent::new("dog", 1, 1)),
        );
        chart.improve(np.clone(), p, Backpointer::Binary(dt, nn));
        chart.improve(root.clone(), p, Backpointer::Unary(np.clone()));

        assert_eq!(
            build_tree(&chart, &root).to_string(),
            "(ROOT (NP (DT the) (NN dog)))"
        );
        assert_eq!(
            build_tree(&chart, &np).to_string(),
            "(NP (DT the) (NN dog))"
        );
        assert!(build_tree(&chart, &Constituent::new("VP", 0, 2)).is_leaf());
        Ok(())
    }
}
