use std::collections::VecDeque;
use std::rc::Rc;

use lattice::{LatticeSentence, Morpheme};
use system::{Dependency, DependencySet, Transition, Transitions};

/// The state of the parser.
///
/// A parser state consists of a stack and a queue of morpheme nodes, the
/// head assignments made so far, and a cursor into the lattice of the
/// input sentence. Node 0 is the virtual root; it is never placed on the
/// stack or the queue. Morphemes are materialized onto the queue as the
/// cursor commits lattice edges; spans of the lattice without
/// segmentation ambiguity are materialized eagerly, so that
/// disambiguation transitions are only required where the lattice
/// actually branches.
///
/// States form a singly-linked history through their predecessor link,
/// which allows the transition sequence to be reconstructed in reverse
/// without copying state.
#[derive(Clone, Debug)]
pub struct ParserState<'a> {
    sentence: &'a LatticeSentence,
    stack: Vec<usize>,
    queue: VecDeque<usize>,
    morphemes: Vec<&'a Morpheme>,
    heads: Vec<Option<(usize, usize)>>,
    cursor: usize,
    last_transition: usize,
    previous: Option<Rc<ParserState<'a>>>,
}

impl<'a> ParserState<'a> {
    /// Create the initial state for a sentence.
    pub fn new(sentence: &'a LatticeSentence) -> Self {
        let mut state = ParserState {
            sentence: sentence,
            stack: Vec::new(),
            queue: VecDeque::new(),
            morphemes: Vec::new(),
            heads: vec![None],
            cursor: 0,
            last_transition: Transitions::NULL,
            previous: None,
        };
        state.materialize_forced();
        state
    }

    /// Apply a transition to a state, producing the successor state.
    ///
    /// The successor carries the dense `number` of the transition and a
    /// predecessor link to `state`.
    pub fn advance<T>(state: &Rc<ParserState<'a>>, transition: &T, number: usize) -> Rc<ParserState<'a>>
    where
        T: Transition,
    {
        let mut next = (**state).clone();
        next.previous = Some(state.clone());
        next.last_transition = number;
        transition.apply(&mut next);
        Rc::new(next)
    }

    pub fn sentence(&self) -> &'a LatticeSentence {
        self.sentence
    }

    /// A state is terminal when all input has been consumed: the stack
    /// and queue are empty and the lattice cursor is at the sink.
    pub fn is_terminal(&self) -> bool {
        self.stack.is_empty() && self.queue.is_empty() && self.cursor == self.sentence.sink()
    }

    pub fn stack(&self) -> &[usize] {
        &self.stack
    }

    pub fn stack_top(&self) -> Option<usize> {
        self.stack.last().cloned()
    }

    /// The `n`-th stack node, counted from the top.
    pub fn stack_nth(&self, n: usize) -> Option<usize> {
        if n < self.stack.len() {
            Some(self.stack[self.stack.len() - 1 - n])
        } else {
            None
        }
    }

    pub fn queue_front(&self) -> Option<usize> {
        self.queue.front().cloned()
    }

    /// The `n`-th queue node, counted from the front.
    pub fn queue_nth(&self, n: usize) -> Option<usize> {
        self.queue.get(n).cloned()
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The number of morphemes materialized so far.
    pub fn n_materialized(&self) -> usize {
        self.morphemes.len()
    }

    /// The morpheme of a node. Returns `None` for the virtual root.
    pub fn morpheme(&self, node: usize) -> Option<&'a Morpheme> {
        if node == 0 {
            return None;
        }

        self.morphemes.get(node - 1).cloned()
    }

    /// The assigned head and relation of a node.
    pub fn head_of(&self, node: usize) -> Option<(usize, usize)> {
        self.heads.get(node).cloned().unwrap_or(None)
    }

    /// The leftmost dependent of a node under the arcs assigned so far.
    pub fn leftmost_dependent(&self, node: usize) -> Option<usize> {
        (1..self.heads.len()).find(|&d| match self.heads[d] {
            Some((head, _)) => head == node,
            None => false,
        })
    }

    /// The rightmost dependent of a node under the arcs assigned so far.
    pub fn rightmost_dependent(&self, node: usize) -> Option<usize> {
        (1..self.heads.len())
            .rev()
            .find(|&d| match self.heads[d] {
                Some((head, _)) => head == node,
                None => false,
            })
    }

    /// The dense number of the transition that produced this state,
    /// `Transitions::NULL` for the initial state.
    pub fn last_transition(&self) -> usize {
        self.last_transition
    }

    /// The transitions that led to this state, in application order.
    pub fn transition_sequence(&self) -> Vec<usize> {
        let mut sequence = Vec::new();

        let mut state = self;
        while state.last_transition != Transitions::NULL {
            sequence.push(state.last_transition);
            state = match state.previous {
                Some(ref previous) => previous,
                None => break,
            };
        }

        sequence.reverse();
        sequence
    }

    /// Project the state to its dependency set.
    pub fn dependencies(&self) -> DependencySet {
        self.heads
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(dependent, head)| {
                head.map(|(head, relation)| Dependency {
                    head: head,
                    relation: relation,
                    dependent: dependent,
                })
            }).collect()
    }

    /// Commit a lattice edge: materialize its morphemes onto the queue
    /// and advance the cursor. Unambiguous spans behind the edge are
    /// materialized as well.
    pub fn commit_edge(&mut self, edge_index: usize) {
        self.commit_one(edge_index);
        self.materialize_forced();
    }

    fn commit_one(&mut self, edge_index: usize) {
        let edge = self.sentence.edge(edge_index);
        debug_assert_eq!(edge.from, self.cursor, "committed edge does not leave the cursor");

        for morpheme in &edge.morphemes {
            self.morphemes.push(morpheme);
            self.heads.push(None);
            let node = self.morphemes.len();
            self.queue.push_back(node);
        }

        self.cursor = edge.to;
    }

    fn materialize_forced(&mut self) {
        while self.sentence.outgoing(self.cursor).len() == 1 {
            let edge_index = self.sentence.outgoing(self.cursor)[0];
            self.commit_one(edge_index);
        }
    }

    pub(crate) fn push_stack(&mut self, node: usize) {
        self.stack.push(node);
    }

    pub(crate) fn pop_stack(&mut self) -> Option<usize> {
        self.stack.pop()
    }

    pub(crate) fn pop_queue(&mut self) -> Option<usize> {
        self.queue.pop_front()
    }

    /// Assign a head to a node. Every node can have at most one head.
    pub(crate) fn add_arc(&mut self, head: usize, relation: usize, dependent: usize) {
        debug_assert!(
            self.heads[dependent].is_none(),
            "node {} already has a head",
            dependent
        );
        self.heads[dependent] = Some((head, relation));
    }
}
