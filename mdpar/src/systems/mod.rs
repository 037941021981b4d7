//! Transition system implementations.

mod arc_eager_morph;
pub use self::arc_eager_morph::{ArcEagerMorphOracle, ArcEagerMorphSystem, ArcEagerMorphTransition};
