//! mdpar is a transition-based parser that jointly performs morphological
//! disambiguation and dependency parsing over lattice input. A lattice
//! encodes the candidate segmentations of a surface sentence; the parser
//! selects one path through the lattice and attaches labeled dependency
//! relations between the selected morphemes.
//!
//! The parser is driven by an arc-eager transition system extended with
//! morphological disambiguation transitions (`systems::ArcEagerMorphSystem`)
//! and scored by a sparse averaged perceptron (`models::AveragedMatrix`).
//! Decoding is greedy and deterministic (`parse::Deterministic`); training
//! uses the early-update averaged perceptron (`train::PerceptronTrainer`).

extern crate enum_map;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
extern crate rayon;
extern crate serde;
#[macro_use]
extern crate serde_derive;

mod error;
pub use error::ParserError;

pub mod features;

pub mod guide;

pub mod lattice;

pub mod models;

mod numberer;
pub use numberer::Numberer;

pub mod parse;

pub mod system;

pub mod systems;

pub mod train;

#[cfg(test)]
mod testdata;

pub type Result<T> = ::std::result::Result<T, ::failure::Error>;
