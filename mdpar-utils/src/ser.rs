use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_cbor;
use toml;

use mdpar::features::LayerLookups;
use mdpar::system::Transitions;

use Result;

/// Deserialization from CBOR readers.
pub trait CborRead: Sized {
    fn from_cbor_read<R>(read: R) -> Result<Self>
    where
        R: Read;
}

impl<T> CborRead for T
where
    T: DeserializeOwned,
{
    fn from_cbor_read<R>(read: R) -> Result<T>
    where
        R: Read,
    {
        Ok(serde_cbor::from_reader(read)?)
    }
}

/// Serialization to CBOR writers.
pub trait CborWrite {
    fn to_cbor_write<W>(&self, write: &mut W) -> Result<()>
    where
        W: Write;
}

impl<T> CborWrite for T
where
    T: Serialize,
{
    fn to_cbor_write<W>(&self, write: &mut W) -> Result<()>
    where
        W: Write,
    {
        serde_cbor::to_writer(write, self)?;
        Ok(())
    }
}

/// Deserialization from TOML readers.
pub trait TomlRead: Sized {
    fn from_toml_read<R>(read: R) -> Result<Self>
    where
        R: Read;
}

impl<T> TomlRead for T
where
    T: DeserializeOwned,
{
    fn from_toml_read<R>(mut read: R) -> Result<T>
    where
        R: Read,
    {
        let mut data = String::new();
        read.read_to_string(&mut data)?;
        Ok(toml::from_str(&data)?)
    }
}

/// The system artifacts written alongside trained model parameters:
/// the transition layout, the string enumerations, and the feature
/// templates used during training.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SystemDescriptor {
    pub transitions: Transitions,
    pub lookups: LayerLookups,
    pub templates: Vec<String>,
}
