//! Arc-eager parsing with morphological disambiguation.

use guide::Guide;
use lattice::Morpheme;
use system::{GoldGraph, ParserState, Transition, TransitionSystem, Transitions};
use ParserError;
use Result;

/// The root relation number. The root relation is interned before all
/// other relation labels.
pub const ROOT_RELATION: usize = 0;

/// Arc-eager transitions, extended with morphological disambiguation.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ArcEagerMorphTransition {
    /// Move the first queue node to the stack.
    Shift,

    /// Pop the stack; the popped node must have a head.
    Reduce,

    /// Attach the stack top to the virtual root and pop it. Only
    /// possible once all input has been consumed.
    PopRoot,

    /// Attach the stack top to the first queue node and pop it.
    LeftArc(usize),

    /// Attach the first queue node to the stack top and shift it.
    RightArc(usize),

    /// Commit the outgoing lattice edge with this choice number,
    /// materializing its morphemes onto the queue.
    MorphChoice(usize),
}

impl Transition for ArcEagerMorphTransition {
    fn is_possible(&self, state: &ParserState) -> bool {
        use self::ArcEagerMorphTransition::*;

        match *self {
            Shift => !state.queue_is_empty(),
            Reduce => match state.stack_top() {
                Some(top) => state.head_of(top).is_some(),
                None => false,
            },
            PopRoot => {
                state.queue_is_empty() && state.cursor() == state.sentence().sink()
                    && match state.stack_top() {
                        Some(top) => state.head_of(top).is_none(),
                        None => false,
                    }
            }
            LeftArc(_) => {
                !state.queue_is_empty() && match state.stack_top() {
                    Some(top) => state.head_of(top).is_none(),
                    None => false,
                }
            }
            RightArc(_) => !state.queue_is_empty() && state.stack_top().is_some(),
            MorphChoice(choice) => {
                state.queue_is_empty()
                    && state
                        .sentence()
                        .outgoing(state.cursor())
                        .iter()
                        .any(|&e| state.sentence().edge(e).choice == choice)
            }
        }
    }

    fn apply(&self, state: &mut ParserState) {
        use self::ArcEagerMorphTransition::*;

        debug_assert!(self.is_possible(state), "transition {:?} is not possible", self);

        match *self {
            Shift => {
                let node = state.pop_queue().expect("shift from an empty queue");
                state.push_stack(node);
            }
            Reduce => {
                state.pop_stack();
            }
            PopRoot => {
                let top = state.pop_stack().expect("pop-root on an empty stack");
                state.add_arc(0, ROOT_RELATION, top);
            }
            LeftArc(relation) => {
                let top = state.pop_stack().expect("left-arc on an empty stack");
                let front = state.queue_front().expect("left-arc without a queue");
                state.add_arc(front, relation, top);
            }
            RightArc(relation) => {
                let top = state.stack_top().expect("right-arc on an empty stack");
                let front = state.pop_queue().expect("right-arc without a queue");
                state.add_arc(top, relation, front);
                state.push_stack(front);
            }
            MorphChoice(choice) => {
                let edge_index = state
                    .sentence()
                    .outgoing(state.cursor())
                    .iter()
                    .cloned()
                    .find(|&e| state.sentence().edge(e).choice == choice)
                    .expect("morphological choice without a matching edge");
                state.commit_edge(edge_index);
            }
        }
    }
}

/// The arc-eager transition system with morphological disambiguation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ArcEagerMorphSystem {
    transitions: Transitions,
}

impl ArcEagerMorphSystem {
    pub fn new(n_relations: usize) -> Self {
        ArcEagerMorphSystem {
            transitions: Transitions::new(n_relations),
        }
    }

    pub fn from_transitions(transitions: Transitions) -> Self {
        ArcEagerMorphSystem {
            transitions: transitions,
        }
    }
}

impl TransitionSystem for ArcEagerMorphSystem {
    type Transition = ArcEagerMorphTransition;
    type Oracle = ArcEagerMorphOracle;

    fn is_terminal(state: &ParserState) -> bool {
        state.is_terminal()
    }

    fn oracle(gold: &GoldGraph) -> Self::Oracle {
        ArcEagerMorphOracle::new(gold)
    }

    fn applicable(&self, state: &ParserState) -> Vec<Self::Transition> {
        use self::ArcEagerMorphTransition::*;

        let mut result = Vec::new();

        for transition in vec![Shift, Reduce, PopRoot] {
            if transition.is_possible(state) {
                result.push(transition);
            }
        }

        if LeftArc(0).is_possible(state) {
            for relation in 0..self.transitions.n_relations() {
                result.push(LeftArc(relation));
            }
        }

        if RightArc(0).is_possible(state) {
            for relation in 0..self.transitions.n_relations() {
                result.push(RightArc(relation));
            }
        }

        if state.queue_is_empty() {
            let mut choices: Vec<usize> = state
                .sentence()
                .outgoing(state.cursor())
                .iter()
                .map(|&e| state.sentence().edge(e).choice)
                .collect();
            choices.sort();
            choices.dedup();
            for choice in choices {
                result.push(MorphChoice(choice));
            }
        }

        result
    }

    fn number(&self, transition: &Self::Transition) -> usize {
        use self::ArcEagerMorphTransition::*;

        match *transition {
            Shift => Transitions::SHIFT,
            Reduce => Transitions::REDUCE,
            PopRoot => Transitions::POP_ROOT,
            LeftArc(relation) => self.transitions.left_arc(relation),
            RightArc(relation) => self.transitions.right_arc(relation),
            MorphChoice(choice) => self.transitions.morph(choice),
        }
    }

    fn transition(&self, number: usize) -> Option<Self::Transition> {
        use self::ArcEagerMorphTransition::*;

        match number {
            Transitions::SHIFT => Some(Shift),
            Transitions::REDUCE => Some(Reduce),
            Transitions::POP_ROOT => Some(PopRoot),
            n if n >= self.transitions.left_arc_start() && n < self.transitions.right_arc_start() => {
                Some(LeftArc(n - self.transitions.left_arc_start()))
            }
            n if n >= self.transitions.right_arc_start() && n < self.transitions.morph_start() => {
                Some(RightArc(n - self.transitions.right_arc_start()))
            }
            n if n >= self.transitions.morph_start() && n < self.transitions.len() => {
                Some(MorphChoice(n - self.transitions.morph_start()))
            }
            _ => None,
        }
    }

    fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    fn transitions_mut(&mut self) -> &mut Transitions {
        &mut self.transitions
    }
}

/// The static training oracle for the arc-eager morphological system.
///
/// The oracle owns a view of the gold analysis: the gold head of every
/// node, the gold dependents of every node, and the gold morpheme path.
pub struct ArcEagerMorphOracle {
    heads: Vec<Option<(usize, usize)>>,
    dependents: Vec<Vec<usize>>,
    morphemes: Vec<Morpheme>,
}

impl ArcEagerMorphOracle {
    pub fn new(gold: &GoldGraph) -> Self {
        let n_nodes = gold.morphemes.len() + 1;
        let mut heads = vec![None; n_nodes];
        let mut dependents = vec![Vec::new(); n_nodes];

        for dependency in &gold.dependencies {
            heads[dependency.dependent] = Some((dependency.head, dependency.relation));
            dependents[dependency.head].push(dependency.dependent);
        }

        for node_dependents in &mut dependents {
            node_dependents.sort();
        }

        ArcEagerMorphOracle {
            heads: heads,
            dependents: dependents,
            morphemes: gold.morphemes.clone(),
        }
    }

    fn gold_head(&self, node: usize) -> Option<(usize, usize)> {
        self.heads.get(node).cloned().unwrap_or(None)
    }

    /// Does `node` still have unattached gold dependents?
    fn has_pending_dependents(&self, node: usize, state: &ParserState) -> bool {
        match self.dependents.get(node) {
            Some(dependents) => dependents.iter().any(|&d| state.head_of(d).is_none()),
            None => false,
        }
    }

    /// Find the outgoing lattice edge whose morphemes continue the gold
    /// morpheme path.
    fn gold_edge(&self, state: &ParserState) -> Option<usize> {
        let consumed = state.n_materialized();
        let sentence = state.sentence();

        for &edge_index in sentence.outgoing(state.cursor()) {
            let edge = sentence.edge(edge_index);
            if consumed + edge.morphemes.len() > self.morphemes.len() {
                continue;
            }

            let gold_span = &self.morphemes[consumed..consumed + edge.morphemes.len()];
            if edge.morphemes.iter().eq(gold_span.iter()) {
                return Some(edge_index);
            }
        }

        None
    }
}

impl Guide for ArcEagerMorphOracle {
    type Transition = ArcEagerMorphTransition;

    fn best_transition(&mut self, state: &ParserState) -> Result<Self::Transition> {
        use self::ArcEagerMorphTransition::*;

        if let (Some(top), Some(front)) = (state.stack_top(), state.queue_front()) {
            if let Some((head, relation)) = self.gold_head(top) {
                if head == front
                    && state.head_of(top).is_none()
                    && !self.has_pending_dependents(top, state)
                {
                    return Ok(LeftArc(relation));
                }
            }

            if let Some((head, relation)) = self.gold_head(front) {
                if head == top {
                    return Ok(RightArc(relation));
                }
            }
        }

        if let Some(top) = state.stack_top() {
            if state.head_of(top).is_some() && !self.has_pending_dependents(top, state) {
                return Ok(Reduce);
            }
        }

        if !state.queue_is_empty() {
            return Ok(Shift);
        }

        if state.cursor() != state.sentence().sink() {
            let edge_index = self.gold_edge(state).ok_or(ParserError::MissingGoldPath)?;
            let choice = state.sentence().edge(edge_index).choice;
            return Ok(MorphChoice(choice));
        }

        if let Some(top) = state.stack_top() {
            if state.head_of(top).is_none()
                && self.gold_head(top).map(|(head, _)| head) == Some(0)
                && !self.has_pending_dependents(top, state)
            {
                return Ok(PopRoot);
            }
        }

        Err(ParserError::OracleUnreachable(
            "no gold transition leads out of the current configuration".to_owned(),
        ).into())
    }
}
