//! Shared fixtures for unit tests.

use features::AddressedExtractor;
use lattice::{LatticeSentence, Morpheme};
use system::{Dependency, DependencySet, GoldGraph};
use systems::ArcEagerMorphSystem;
use system::TransitionSystem;

pub const ROOT_REL: usize = 0;
pub const OBJ_REL: usize = 1;

pub const N_RELATIONS: usize = 2;

pub fn m(word: usize, pos: usize) -> Morpheme {
    Morpheme::new(word, pos, word)
}

pub fn dep(head: usize, relation: usize, dependent: usize) -> Dependency {
    Dependency {
        head: head,
        relation: relation,
        dependent: dependent,
    }
}

fn dependency_set(dependencies: Vec<Dependency>) -> DependencySet {
    dependencies.into_iter().collect()
}

/// The empty sentence: only the virtual root.
pub fn empty_gold() -> GoldGraph {
    GoldGraph::new(
        LatticeSentence::unambiguous(Vec::new()),
        Vec::new(),
        DependencySet::new(),
    )
}

/// Two tokens `a b` with gold arcs `root -> a` and `a -obj-> b`.
pub fn two_token_gold() -> GoldGraph {
    let morphemes = vec![m(2, 1), m(3, 2)];
    GoldGraph::new(
        LatticeSentence::unambiguous(morphemes.clone()),
        morphemes,
        dependency_set(vec![dep(0, ROOT_REL, 1), dep(1, OBJ_REL, 2)]),
    )
}

/// Four tokens with the crossing arcs `1 -> 3` and `2 -> 4`.
pub fn nonprojective_gold() -> GoldGraph {
    let morphemes = vec![m(2, 1), m(3, 1), m(4, 1), m(5, 1)];
    GoldGraph::new(
        LatticeSentence::unambiguous(morphemes.clone()),
        morphemes,
        dependency_set(vec![
            dep(0, ROOT_REL, 1),
            dep(4, OBJ_REL, 2),
            dep(1, OBJ_REL, 3),
            dep(3, OBJ_REL, 4),
        ]),
    )
}

/// A sentence whose first token has two segmentations: one morpheme
/// (choice 0) or two morphemes (choice 1). The gold path takes choice 1.
pub fn ambiguous_gold() -> GoldGraph {
    let mut sentence = LatticeSentence::new(3);
    sentence.add_edge(0, 1, 0, vec![m(10, 1)]);
    sentence.add_edge(0, 1, 1, vec![m(11, 1), m(12, 2)]);
    sentence.add_edge(1, 2, 2, vec![m(13, 1)]);

    GoldGraph::new(
        sentence,
        vec![m(11, 1), m(12, 2), m(13, 1)],
        dependency_set(vec![
            dep(0, ROOT_REL, 1),
            dep(1, OBJ_REL, 2),
            dep(1, OBJ_REL, 3),
        ]),
    )
}

/// A transition system sized for a gold graph.
pub fn system_for(gold: &GoldGraph) -> ArcEagerMorphSystem {
    let mut system = ArcEagerMorphSystem::new(N_RELATIONS);
    if let Some(choice) = gold.sentence.max_choice() {
        system.transitions_mut().observe_choice(choice);
    }

    system
}

/// A small extractor over relation-free templates.
pub fn extractor() -> AddressedExtractor {
    AddressedExtractor::parse(&["S0w", "N0w", "S0p+N0p", "S0w+N0w"]).unwrap()
}
