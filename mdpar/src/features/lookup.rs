use enum_map::{Enum, EnumMap};

use numberer::Numberer;

/// The number of the virtual root in every string layer.
pub const ROOT_NUMBER: usize = 0;

/// The number of the unknown marker in every string layer.
pub const UNKNOWN_NUMBER: usize = 1;

/// The string layers known to the enumeration registry.
#[derive(Clone, Copy, Debug, Enum, Eq, PartialEq, Serialize, Deserialize)]
pub enum Layer {
    Word,
    Pos,
    WordPos,
    DepRel,
    MorphProp,
}

/// Per-layer enumerations of domain strings.
///
/// The registry is mutable while a corpus is read and frozen afterwards
/// by sharing it immutably; reads on the shared registry are lock-free.
/// The `Word`, `Pos`, and `WordPos` layers reserve number 0 for the
/// virtual root and number 1 for unknown values; the `DepRel` layer
/// reserves number 0 for the root relation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LayerLookups(EnumMap<Layer, Numberer<String>>);

impl LayerLookups {
    pub fn new() -> Self {
        let mut lookups: EnumMap<Layer, Numberer<String>> = EnumMap::new();

        for layer in vec![Layer::Word, Layer::Pos, Layer::WordPos] {
            lookups[layer].add("<root>".to_owned());
            lookups[layer].add("<unknown>".to_owned());
        }
        lookups[Layer::DepRel].add("ROOT".to_owned());

        LayerLookups(lookups)
    }

    pub fn layer_lookup(&self, layer: Layer) -> &Numberer<String> {
        &self.0[layer]
    }

    pub fn layer_lookup_mut(&mut self, layer: Layer) -> &mut Numberer<String> {
        &mut self.0[layer]
    }

    /// The number of a value in a layer, falling back to the unknown
    /// marker.
    pub fn number_or_unknown(&self, layer: Layer, value: &str) -> usize {
        self.0[layer]
            .number(&value.to_owned())
            .unwrap_or(UNKNOWN_NUMBER)
    }
}

impl Default for LayerLookups {
    fn default() -> Self {
        LayerLookups::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Layer, LayerLookups, ROOT_NUMBER, UNKNOWN_NUMBER};

    #[test]
    fn root_and_unknown_are_reserved() {
        let lookups = LayerLookups::new();
        assert_eq!(
            lookups.layer_lookup(Layer::Word).number(&"<root>".to_owned()),
            Some(ROOT_NUMBER)
        );
        assert_eq!(
            lookups
                .layer_lookup(Layer::Word)
                .number(&"<unknown>".to_owned()),
            Some(UNKNOWN_NUMBER)
        );
        assert_eq!(
            lookups.layer_lookup(Layer::DepRel).number(&"ROOT".to_owned()),
            Some(0)
        );
    }

    #[test]
    fn unseen_values_map_to_unknown() {
        let mut lookups = LayerLookups::new();
        let n = lookups.layer_lookup_mut(Layer::Word).add("house".to_owned());
        assert_eq!(lookups.number_or_unknown(Layer::Word, "house"), n);
        assert_eq!(
            lookups.number_or_unknown(Layer::Word, "unseen"),
            UNKNOWN_NUMBER
        );
    }
}
