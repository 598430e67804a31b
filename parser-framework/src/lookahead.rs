//! Bounded-lookahead selection of disjunction alternatives.
//!
//! Every alternative gets a [`Signature`]: the set of token-shape paths, at
//! most [`LookaheadOptions::tokens`] long, that can begin it. Paths expand
//! through optional, repeated, grouped and nested-disjunction prefixes and
//! through schema references (up to [`LookaheadOptions::expansion`] levels).
//!
//! Selection peeks at the upcoming tokens and ranks the alternatives whose
//! signature contains a fully matching path. Ranks compare token by token:
//! an exact literal beats a type-only match at the first position where two
//! paths differ, and a path that continues past another path's end beats
//! it. Equal ranks go to the alternative declared first.
//!
//! An alternative that can match nothing has the empty path, which matches
//! every input with the lowest rank. It is the fallback when nothing more
//! specific applies.
//!
//! Known limitation: a reference nested deeper than `expansion`, or a path
//! set cut down by [`MAX_PATHS`], ends in [`Shape::Opaque`]. Opaque matches
//! any token without adding to the rank, so alternatives that only differ
//! past that point fall back to declaration order.

use crate::grammar::Node;
use crate::schema::Descriptor;
use lexer_framework::{SymbolId, Symbols, Token, EOF};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Upper bound on the number of distinct paths kept for one node.
pub const MAX_PATHS: usize = 256;

/// Tunables of the disjunction resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookaheadOptions {
    /// How many upcoming tokens may be examined
    pub tokens: usize,
    /// How many nested schema references are followed while computing
    /// signatures
    pub expansion: usize,
}

impl Default for LookaheadOptions {
    fn default() -> Self {
        Self {
            tokens: 4,
            expansion: 8,
        }
    }
}

/// What a single lookahead position can accept.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shape {
    Literal { value: String, kind: Option<SymbolId> },
    Type(SymbolId),
    /// Anything; the expansion stopped here
    Opaque,
}

impl Shape {
    pub fn matches(&self, token: &Token) -> bool {
        match self {
            Shape::Literal { value, kind } => {
                token.value == *value && kind.map_or(true, |kind| kind == token.kind)
            }
            Shape::Type(kind) => token.kind == *kind,
            Shape::Opaque => true,
        }
    }

    fn specificity(&self) -> u8 {
        match self {
            Shape::Literal { .. } => 2,
            Shape::Type(_) => 1,
            Shape::Opaque => 0,
        }
    }

    /// Human-readable form used in "expected ..." messages.
    pub fn describe(&self, symbols: &Symbols) -> String {
        match self {
            Shape::Literal { value, kind: None } => format!("{value:?}"),
            Shape::Literal {
                value,
                kind: Some(kind),
            } => format!("{value:?}:{}", symbol_name(symbols, *kind)),
            Shape::Type(EOF) => "<EOF>".to_string(),
            Shape::Type(kind) => symbol_name(symbols, *kind),
            Shape::Opaque => "...".to_string(),
        }
    }
}

fn symbol_name(symbols: &Symbols, kind: SymbolId) -> String {
    symbols
        .name(kind)
        .map(str::to_string)
        .unwrap_or_else(|| format!("symbol {kind}"))
}

type Path = Vec<Shape>;
type PathSet = BTreeSet<Path>;

fn is_closed(path: &Path, budget: usize) -> bool {
    path.len() >= budget || path.last() == Some(&Shape::Opaque)
}

/// The token paths that can begin one alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    paths: Vec<Path>,
}

impl Signature {
    pub fn paths(&self) -> &[Vec<Shape>] {
        &self.paths
    }

    /// Number of tokens that must be peeked to test every path.
    pub fn depth(&self) -> usize {
        self.paths
            .iter()
            .map(|path| path.iter().take_while(|s| **s != Shape::Opaque).count())
            .max()
            .unwrap_or(0)
    }

    /// The best rank among fully matching paths, or `None` when no path
    /// matches `window`. A rank lists the specificity of every concrete
    /// shape matched.
    pub fn rank(&self, window: &[Token]) -> Option<Vec<u8>> {
        self.paths
            .iter()
            .filter_map(|path| rank_path(path, window))
            .max_by(compare_rank)
    }
}

fn rank_path(path: &Path, window: &[Token]) -> Option<Vec<u8>> {
    let mut rank = Vec::with_capacity(path.len());
    for (i, shape) in path.iter().enumerate() {
        if *shape == Shape::Opaque {
            break;
        }
        let token = window.get(i).or_else(|| window.last())?;
        if !shape.matches(token) {
            return None;
        }
        rank.push(shape.specificity());
    }
    Some(rank)
}

/// Lexicographic on specificity, so a literal on the next token outranks
/// any longer type-only path, and a path outranks its own prefix.
fn compare_rank(a: &Vec<u8>, b: &Vec<u8>) -> std::cmp::Ordering {
    a.cmp(b)
}

/// Picks the alternative for the peeked `window`; `None` when no
/// alternative can start there.
pub fn choose(signatures: &[Signature], window: &[Token]) -> Option<usize> {
    let mut best: Option<(usize, Vec<u8>)> = None;
    for (index, signature) in signatures.iter().enumerate() {
        let Some(rank) = signature.rank(window) else {
            continue;
        };
        let better = match &best {
            None => true,
            Some((_, current)) => compare_rank(&rank, current).is_gt(),
        };
        if better {
            best = Some((index, rank));
        }
    }
    best.map(|(index, _)| index)
}

/// For a window no alternative accepts: how many tokens the best paths
/// matched before diverging, and the shapes they expected at that point.
pub fn divergence(signatures: &[Signature], window: &[Token]) -> (usize, Vec<Shape>) {
    let mut depth = 0;
    let mut expected = BTreeSet::new();
    for path in signatures.iter().flat_map(|s| s.paths.iter()) {
        let matched = path
            .iter()
            .enumerate()
            .take_while(|(i, shape)| {
                window
                    .get(*i)
                    .or_else(|| window.last())
                    .is_some_and(|token| shape.matches(token))
            })
            .count();
        let Some(shape) = path.get(matched) else {
            continue;
        };
        if matched > depth {
            depth = matched;
            expected.clear();
        }
        if matched == depth {
            expected.insert(shape.clone());
        }
    }
    (depth, expected.into_iter().collect())
}

/// Computes one signature per alternative.
pub fn signatures(alternatives: &[Node], descriptors: &[Arc<Descriptor>], options: LookaheadOptions) -> Vec<Signature> {
    let expander = Expander {
        descriptors,
        expansion: options.expansion,
    };
    alternatives
        .iter()
        .map(|alternative| Signature {
            paths: expander.first(alternative, options.tokens.max(1), 0).into_iter().collect(),
        })
        .collect()
}

struct Expander<'a> {
    descriptors: &'a [Arc<Descriptor>],
    expansion: usize,
}

impl Expander<'_> {
    /// Paths of at most `budget` shapes that can begin `node`. A path shorter
    /// than `budget` that does not end in `Opaque` means `node` can finish
    /// after it.
    fn first(&self, node: &Node, budget: usize, depth: usize) -> PathSet {
        if budget == 0 {
            return PathSet::from([Vec::new()]);
        }
        match node {
            Node::Literal { value, kind } => PathSet::from([vec![Shape::Literal {
                value: value.clone(),
                kind: *kind,
            }]]),
            Node::Type(kind) => PathSet::from([vec![Shape::Type(*kind)]]),
            Node::End => PathSet::from([vec![Shape::Type(EOF)]]),
            Node::Capture { inner, .. } | Node::Group(inner) => self.first(inner, budget, depth),
            Node::Optional(inner) => {
                let mut paths = self.first(inner, budget, depth);
                paths.insert(Vec::new());
                paths
            }
            Node::Sequence(children) => children
                .iter()
                .fold(PathSet::from([Vec::new()]), |acc, child| self.extend(acc, child, budget, depth)),
            Node::Disjunction(disjunction) => {
                let mut paths = PathSet::new();
                for alternative in disjunction.alternatives() {
                    paths.extend(self.first(alternative, budget, depth));
                }
                bound(paths, budget)
            }
            Node::Repetition { inner, min } => {
                let mut acc = PathSet::from([Vec::new()]);
                for _ in 0..(*min).min(budget) {
                    acc = self.extend(acc, inner, budget, depth);
                }
                for _ in 0..=budget {
                    if acc.iter().all(|path| is_closed(path, budget)) {
                        break;
                    }
                    let mut next = acc.clone();
                    next.extend(self.extend(acc.clone(), inner, budget, depth));
                    let next = bound(next, budget);
                    if next == acc {
                        break;
                    }
                    acc = next;
                }
                acc
            }
            Node::Reference(id) => {
                let root = self.descriptors.get(id.index()).and_then(|d| d.root());
                match root {
                    Some(root) if depth < self.expansion => self.first(root, budget, depth + 1),
                    _ => PathSet::from([vec![Shape::Opaque]]),
                }
            }
        }
    }

    /// Appends `node` to every open path of `acc`.
    fn extend(&self, acc: PathSet, node: &Node, budget: usize, depth: usize) -> PathSet {
        let mut out = PathSet::new();
        let mut suffixes: HashMap<usize, PathSet> = HashMap::new();
        for path in acc {
            if is_closed(&path, budget) {
                out.insert(path);
                continue;
            }
            let remaining = budget - path.len();
            let tails = suffixes
                .entry(remaining)
                .or_insert_with(|| self.first(node, remaining, depth));
            for tail in tails.iter() {
                let mut joined = path.clone();
                joined.extend(tail.iter().cloned());
                out.insert(joined);
            }
        }
        bound(out, budget)
    }
}

/// Shortens paths, ending them in `Opaque`, until at most [`MAX_PATHS`]
/// remain.
fn bound(mut paths: PathSet, budget: usize) -> PathSet {
    let mut keep = budget;
    while paths.len() > MAX_PATHS && keep > 0 {
        keep -= 1;
        paths = paths
            .into_iter()
            .map(|mut path| {
                if path.len() > keep {
                    path.truncate(keep);
                    path.push(Shape::Opaque);
                }
                path
            })
            .collect();
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_framework::Position;

    const IDENT: SymbolId = -2;

    fn lit(value: &str) -> Node {
        Node::literal(value)
    }

    fn tokens(values: &[&str]) -> Vec<Token> {
        let mut out: Vec<Token> = values
            .iter()
            .map(|v| Token::new(IDENT, *v, Position::new()))
            .collect();
        out.push(Token::eof(Position::new()));
        out
    }

    fn pick(alternatives: &[Node], input: &[&str]) -> Option<usize> {
        let signatures = signatures(alternatives, &[], LookaheadOptions::default());
        choose(&signatures, &tokens(input))
    }

    #[test]
    fn test_longer_match_wins() {
        let a = Node::Sequence(vec![lit("hello"), Node::Type(IDENT)]);
        let b = Node::Sequence(vec![lit("hello"), Node::Type(IDENT), lit("world")]);
        let alternatives = [a, b];
        assert_eq!(pick(&alternatives, &["hello", "moo"]), Some(0));
        assert_eq!(pick(&alternatives, &["hello", "moo", "world"]), Some(1));
    }

    #[test]
    fn test_literal_beats_type() {
        let a = Node::Sequence(vec![lit("hello"), Node::Type(IDENT)]);
        let b = Node::Sequence(vec![lit("hello"), lit("world")]);
        let alternatives = [a, b];
        assert_eq!(pick(&alternatives, &["hello", "ONE"]), Some(0));
        assert_eq!(pick(&alternatives, &["hello", "world"]), Some(1));
    }

    #[test]
    fn test_nested_disjunction_expands() {
        let inner = Node::disjunction(vec![
            Node::Sequence(vec![lit("foo"), Node::Type(IDENT)]),
            Node::Sequence(vec![lit("bar"), lit("waz"), Node::Type(IDENT)]),
        ]);
        let a = Node::Sequence(vec![lit("hello"), Node::group(inner)]);
        let b = Node::Sequence(vec![lit("hello"), lit("world")]);
        assert_eq!(pick(&[a, b], &["hello", "foo", "FOO"]), Some(0));
    }

    #[test]
    fn test_nullable_alternative_is_fallback() {
        let a = lit("x");
        let b = Node::optional(lit("y"));
        let alternatives = [a, b];
        assert_eq!(pick(&alternatives, &["x"]), Some(0));
        assert_eq!(pick(&alternatives, &["z"]), Some(1));
    }

    #[test]
    fn test_no_alternative_matches() {
        assert_eq!(pick(&[lit("x"), lit("y")], &["z"]), None);
    }

    #[test]
    fn test_divergence_points_at_first_bad_token() {
        let alternatives = [
            Node::Sequence(vec![Node::Type(IDENT), lit("=")]),
            Node::Sequence(vec![Node::Type(IDENT), lit("{")]),
        ];
        let signatures = signatures(&alternatives, &[], LookaheadOptions::default());
        let (depth, expected) = divergence(&signatures, &tokens(&["key", "value"]));
        assert_eq!(depth, 1);
        assert_eq!(
            expected,
            vec![
                Shape::Literal { value: "=".into(), kind: None },
                Shape::Literal { value: "{".into(), kind: None },
            ]
        );
    }

    #[test]
    fn test_literal_on_next_token_beats_longer_type_path() {
        let decl = Node::Sequence(vec![Node::Type(IDENT), Node::Type(IDENT)]);
        let stop = lit("end");
        let alternatives = [decl, stop];
        assert_eq!(pick(&alternatives, &["end", "x", "y"]), Some(1));
        assert_eq!(pick(&alternatives, &["x", "y"]), Some(0));
    }

    #[test]
    fn test_ties_go_to_first_declared() {
        let alternatives = [Node::Type(IDENT), Node::Type(IDENT)];
        assert_eq!(pick(&alternatives, &["a"]), Some(0));
    }

    #[test]
    fn test_repetition_prefix_is_transparent() {
        let a = Node::Sequence(vec![Node::repetition(lit("-"), 0), lit("a")]);
        let b = Node::Sequence(vec![Node::repetition(lit("-"), 0), lit("b")]);
        assert_eq!(pick(&[a.clone(), b.clone()], &["-", "-", "b"]), Some(1));
        assert_eq!(pick(&[a, b], &["a"]), Some(0));
    }

    #[test]
    fn test_paths_respect_horizon() {
        let long = Node::Sequence((0..10).map(|i| lit(&i.to_string())).collect());
        let options = LookaheadOptions {
            tokens: 3,
            expansion: 8,
        };
        let signature = &signatures(&[long], &[], options)[0];
        assert_eq!(signature.paths().len(), 1);
        assert_eq!(signature.depth(), 3);
    }

    #[test]
    fn test_bound_truncates_to_opaque() {
        let paths: PathSet = (0..MAX_PATHS + 10)
            .map(|i| vec![Shape::Type(IDENT), Shape::Literal { value: i.to_string(), kind: None }])
            .collect();
        let bounded = bound(paths, 2);
        assert_eq!(bounded.len(), 1);
        assert!(bounded.contains(&vec![Shape::Type(IDENT), Shape::Opaque]));
    }
}
