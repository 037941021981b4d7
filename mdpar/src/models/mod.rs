//! Parameter models.

use std::rc::Rc;

use features::{FeatureValue, FeatureVector};

mod averaged;
pub use self::averaged::{
    AveragedMatrix, AveragedMatrixSerialized, AveragedStrategy, AveragedWeight, MODEL_VERSION,
};

/// A reversed feature history.
///
/// Every node pairs the transition that was taken with the feature
/// vector of the configuration it produced. The list is built head
/// first, so walking `previous` links yields the history in reverse.
/// Nodes are shared through reference counting: speculative histories
/// branch off a common prefix without copying it, and a node lives
/// until both the gold and the decoded trail have released it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeaturesList {
    pub features: FeatureVector,
    pub transition: usize,
    pub previous: Option<Rc<FeaturesList>>,
}

impl FeaturesList {
    /// Extend a history with a new `(features, transition)` node.
    pub fn extend(
        previous: Option<Rc<FeaturesList>>,
        features: FeatureVector,
        transition: usize,
    ) -> Rc<FeaturesList> {
        Rc::new(FeaturesList {
            features: features,
            transition: transition,
            previous: previous,
        })
    }

    /// The number of nodes in the history.
    pub fn len(&self) -> usize {
        let mut len = 1;
        let mut node = &self.previous;
        while let Some(ref previous) = *node {
            len += 1;
            node = &previous.previous;
        }

        len
    }
}

/// Scoring of transitions from feature vectors.
///
/// This is the seam between decoders and parameter models; the greedy
/// classifier and future beam decoders score candidates through this
/// trait.
pub trait TransitionModel {
    /// The score of a transition for a single feature vector.
    fn transition_score(&self, transition: usize, features: &[Option<FeatureValue>]) -> i64;

    /// Fill `scores` with the scores of every transition number for a
    /// feature vector.
    fn set_transition_scores(&self, features: &[Option<FeatureValue>], scores: &mut Vec<i64>);
}
