use cky_pcfg_parser::{
    Parser, ParsingConfig,
    annotations::Markovization,
    grammar::RuleSet,
    grammars::TOY_TREEBANK,
    lexicon::TreebankLexicon,
    trees::Tree,
};
use lazy_static::lazy_static;

fn main() {
    // Run registered benchmarks.
    divan::main();
}

lazy_static! {
    static ref TREEBANK: Vec<Tree> = Tree::parse_many(TOY_TREEBANK).unwrap();
    static ref CONFIG: ParsingConfig =
        ParsingConfig::new("ROOT", Markovization::new(1, Some(1)).unwrap());
    static ref PARSER: Parser<RuleSet, TreebankLexicon> =
        Parser::train(&TREEBANK, CONFIG.clone()).unwrap();
}

#[divan::bench]
fn train() {
    Parser::train(divan::black_box(&TREEBANK), CONFIG.clone()).unwrap();
}

#[divan::bench]
fn parse_long_sentence() {
    let sentence: Vec<&str> = divan::black_box(
        "the cat chased the small dog with a telescope on the table ."
            .split(' ')
            .collect(),
    );
    PARSER.parse(&sentence).unwrap().unwrap();
}

#[divan::bench]
fn parse_treebank() {
    for tree in TREEBANK.iter() {
        let words = divan::black_box(tree.words());
        PARSER.parse(&words).unwrap().unwrap();
    }
}
