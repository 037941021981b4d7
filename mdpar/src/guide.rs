//! Guides steer the parser through its search space.

use system::ParserState;
use Result;

/// A guide proposes the next transition for a parser state.
///
/// Guides are implemented by training oracles, which read the correct
/// transition off a gold analysis, and by classifiers, which pick the
/// best-scoring transition under a model. Alternative decoders (such as
/// a beam decoder) plug in behind this trait as well.
pub trait Guide {
    type Transition;

    fn best_transition(&mut self, state: &ParserState) -> Result<Self::Transition>;
}
