//! Parser configurations and the transition-system interface.

use std::collections::HashSet;

use lattice::{LatticeSentence, Morpheme};

mod parser_state;
pub use self::parser_state::ParserState;

mod trans_system;
pub use self::trans_system::{Transition, TransitionSystem, Transitions};

/// A labeled dependency: `head` governs `dependent` with `relation`.
///
/// The head, dependent, and relation are dense numbers; node 0 is the
/// virtual root.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub head: usize,
    pub relation: usize,
    pub dependent: usize,
}

pub type DependencySet = HashSet<Dependency>;

/// A gold-standard analysis used for training and oracle parses.
///
/// The gold morphemes are the materialized morphemes of the correct
/// lattice path, in order. The dependency set refers to morphemes by
/// their position in that path (1-based, 0 being the virtual root).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GoldGraph {
    pub sentence: LatticeSentence,
    pub morphemes: Vec<Morpheme>,
    pub dependencies: DependencySet,
}

impl GoldGraph {
    pub fn new(
        sentence: LatticeSentence,
        morphemes: Vec<Morpheme>,
        dependencies: DependencySet,
    ) -> Self {
        GoldGraph {
            sentence: sentence,
            morphemes: morphemes,
            dependencies: dependencies,
        }
    }

    /// The gold head and relation of a node.
    pub fn head_of(&self, node: usize) -> Option<(usize, usize)> {
        self.dependencies
            .iter()
            .find(|dep| dep.dependent == node)
            .map(|dep| (dep.head, dep.relation))
    }
}
