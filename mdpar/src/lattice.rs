//! Morphological lattices.
//!
//! A lattice is a directed acyclic graph over the candidate morphological
//! analyses of a surface sentence. Nodes are numbered topologically from
//! the source (node 0) to the sink; every edge carries the morphemes of
//! one candidate segmentation span together with the number of the
//! morphological choice that selects the edge.

/// A single morpheme candidate.
///
/// All fields are dense numbers assigned by the enumeration registry
/// (`features::LayerLookups`).
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Morpheme {
    pub word: usize,
    pub pos: usize,
    pub word_pos: usize,
    pub properties: Vec<usize>,
}

impl Morpheme {
    pub fn new(word: usize, pos: usize, word_pos: usize) -> Self {
        Morpheme {
            word: word,
            pos: pos,
            word_pos: word_pos,
            properties: Vec::new(),
        }
    }
}

/// An edge in a lattice, covering one or more morphemes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LatticeEdge {
    pub from: usize,
    pub to: usize,

    /// The number of the morphological choice that commits this edge.
    pub choice: usize,

    pub morphemes: Vec<Morpheme>,
}

/// A lattice-encoded input sentence.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LatticeSentence {
    n_nodes: usize,
    edges: Vec<LatticeEdge>,
    outgoing: Vec<Vec<usize>>,
}

impl LatticeSentence {
    /// Create a lattice with `n_nodes` nodes and no edges. A lattice
    /// must have at least one node; node 0 is the source and node
    /// `n_nodes - 1` the sink.
    pub fn new(n_nodes: usize) -> Self {
        assert!(n_nodes > 0, "a lattice requires at least one node");

        LatticeSentence {
            n_nodes: n_nodes,
            edges: Vec::new(),
            outgoing: vec![Vec::new(); n_nodes],
        }
    }

    /// Create an unambiguous lattice: a linear chain with one edge per
    /// morpheme. Such a lattice never requires morphological
    /// disambiguation transitions.
    pub fn unambiguous(morphemes: Vec<Morpheme>) -> Self {
        let mut sentence = LatticeSentence::new(morphemes.len() + 1);
        for (i, morpheme) in morphemes.into_iter().enumerate() {
            sentence.add_edge(i, i + 1, 0, vec![morpheme]);
        }

        sentence
    }

    /// Add an edge to the lattice. Edges must run forward with respect
    /// to the topological node numbering, which excludes cycles.
    pub fn add_edge(&mut self, from: usize, to: usize, choice: usize, morphemes: Vec<Morpheme>) {
        assert!(from < to, "lattice edges must run forward");
        assert!(to < self.n_nodes, "lattice edge beyond the sink");
        assert!(!morphemes.is_empty(), "lattice edge without morphemes");

        let edge_index = self.edges.len();
        self.edges.push(LatticeEdge {
            from: from,
            to: to,
            choice: choice,
            morphemes: morphemes,
        });
        self.outgoing[from].push(edge_index);
    }

    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    pub fn sink(&self) -> usize {
        self.n_nodes - 1
    }

    pub fn edge(&self, index: usize) -> &LatticeEdge {
        &self.edges[index]
    }

    /// The indices of the edges leaving `node`.
    pub fn outgoing(&self, node: usize) -> &[usize] {
        &self.outgoing[node]
    }

    /// The largest morphological choice number used by any edge.
    pub fn max_choice(&self) -> Option<usize> {
        self.edges.iter().map(|e| e.choice).max()
    }
}
