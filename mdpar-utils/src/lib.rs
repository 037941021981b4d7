//! Configuration, serialization, and command-line plumbing for mdpar.

extern crate conllx;
#[macro_use]
extern crate failure;
extern crate mdpar;
extern crate serde;
extern crate serde_cbor;
#[macro_use]
extern crate serde_derive;
extern crate toml;

#[macro_use]
mod macros;

mod config;
pub use config::{Config, Features, Model, Parser};

mod corpus;
pub use corpus::{gold_from_conll, lattice_from_conll, set_heads};

mod ser;
pub use ser::{CborRead, CborWrite, SystemDescriptor, TomlRead};

mod util;
pub use util::OrExit;

pub type Result<T> = ::std::result::Result<T, ::failure::Error>;
