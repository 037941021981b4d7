use std::fmt::Debug;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

use guide::Guide;
use system::{GoldGraph, ParserState};

/// A transition system: the set of transitions that rewrite parser
/// states, together with a terminal test and a training oracle.
pub trait TransitionSystem {
    type Transition: Transition;
    type Oracle: Guide<Transition = Self::Transition>;

    fn is_terminal(state: &ParserState) -> bool;
    fn oracle(gold: &GoldGraph) -> Self::Oracle;

    /// The transitions applicable in a state, in ascending order of
    /// their dense numbers.
    fn applicable(&self, state: &ParserState) -> Vec<Self::Transition>;

    /// The dense number of a transition.
    fn number(&self, transition: &Self::Transition) -> usize;

    /// The transition with a dense number, if the number identifies one.
    fn transition(&self, number: usize) -> Option<Self::Transition>;

    fn transitions(&self) -> &Transitions;
    fn transitions_mut(&mut self) -> &mut Transitions;
}

/// A single transition.
pub trait Transition: Clone + Debug + Eq + Hash + Serialize + DeserializeOwned {
    fn is_possible(&self, state: &ParserState) -> bool;
    fn apply(&self, state: &mut ParserState);
}

/// The dense transition numbering.
///
/// Transition numbers are laid out in contiguous bands so that the kind
/// of a transition can be recovered by range comparison and per-number
/// score arrays can be sliced by band:
///
/// * 0: the null transition (sentinel, never applicable);
/// * 1: shift, 2: reduce, 5: pop-root (3 and 4 are reserved band slots,
///   kept so that numbers stay aligned with other arc-eager layouts);
/// * one left-arc number per relation, relation 0 (the root relation)
///   first;
/// * one right-arc number per relation;
/// * one morphological-disambiguation number per morphological choice.
///
/// The relation band sizes are fixed at construction; the
/// disambiguation band grows while lattices are read and is frozen
/// before training starts.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transitions {
    n_relations: usize,
    n_choices: usize,
}

impl Transitions {
    pub const NULL: usize = 0;
    pub const SHIFT: usize = 1;
    pub const REDUCE: usize = 2;
    pub const POP_ROOT: usize = 5;
    pub const LEFT_ARC_START: usize = 6;

    pub fn new(n_relations: usize) -> Self {
        assert!(n_relations > 0, "at least the root relation is required");

        Transitions {
            n_relations: n_relations,
            n_choices: 0,
        }
    }

    pub fn null(&self) -> usize {
        Self::NULL
    }

    /// The number of transition numbers, including the sentinel and the
    /// reserved slots.
    pub fn len(&self) -> usize {
        self.morph_start() + self.n_choices
    }

    pub fn n_relations(&self) -> usize {
        self.n_relations
    }

    pub fn n_choices(&self) -> usize {
        self.n_choices
    }

    pub fn left_arc_start(&self) -> usize {
        Self::LEFT_ARC_START
    }

    pub fn right_arc_start(&self) -> usize {
        Self::LEFT_ARC_START + self.n_relations
    }

    pub fn morph_start(&self) -> usize {
        Self::LEFT_ARC_START + 2 * self.n_relations
    }

    pub fn left_arc(&self, relation: usize) -> usize {
        debug_assert!(relation < self.n_relations);
        self.left_arc_start() + relation
    }

    pub fn right_arc(&self, relation: usize) -> usize {
        debug_assert!(relation < self.n_relations);
        self.right_arc_start() + relation
    }

    /// The number of a morphological choice. Choices that were never
    /// observed map beyond `len`; such transitions score zero.
    pub fn morph(&self, choice: usize) -> usize {
        self.morph_start() + choice
    }

    /// Record a morphological choice number, growing the
    /// disambiguation band when necessary.
    pub fn observe_choice(&mut self, choice: usize) {
        if choice >= self.n_choices {
            self.n_choices = choice + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Transitions;

    #[test]
    fn bands_are_contiguous() {
        let mut transitions = Transitions::new(3);
        transitions.observe_choice(1);

        assert_eq!(transitions.left_arc(0), 6);
        assert_eq!(transitions.left_arc(2), 8);
        assert_eq!(transitions.right_arc(0), 9);
        assert_eq!(transitions.right_arc(2), 11);
        assert_eq!(transitions.morph(0), 12);
        assert_eq!(transitions.morph(1), 13);
        assert_eq!(transitions.len(), 14);
    }

    #[test]
    fn choice_band_grows_monotonically() {
        let mut transitions = Transitions::new(1);
        assert_eq!(transitions.n_choices(), 0);
        transitions.observe_choice(4);
        assert_eq!(transitions.n_choices(), 5);
        transitions.observe_choice(2);
        assert_eq!(transitions.n_choices(), 5);
    }
}
