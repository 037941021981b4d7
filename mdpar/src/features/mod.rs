//! Feature values and feature extraction.

use system::ParserState;

mod addressed;
pub use self::addressed::AddressedExtractor;

mod lookup;
pub use self::lookup::{Layer, LayerLookups, ROOT_NUMBER, UNKNOWN_NUMBER};

/// An opaque feature value: up to four packed components.
///
/// Feature values are hashable tokens; the model does not interpret
/// their contents. Components are typically numbers assigned by the
/// enumeration registry.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum FeatureValue {
    One(u32),
    Two(u32, u32),
    Three(u32, u32, u32),
    Four(u32, u32, u32, u32),
}

/// A feature vector with one slot per feature template.
///
/// Position `i` always belongs to template `i`; `None` marks a feature
/// that is missing in the current configuration.
pub type FeatureVector = Vec<Option<FeatureValue>>;

/// Extraction of feature vectors from parser states.
///
/// The vector length equals `feature_count` on every call.
pub trait FeatureExtractor {
    fn feature_count(&self) -> usize;

    fn features(&self, state: &ParserState) -> FeatureVector;

    /// Human-readable template descriptors, stored alongside serialized
    /// models.
    fn descriptors(&self) -> Vec<String>;
}
