use features::{FeatureExtractor, FeatureValue, FeatureVector};
use system::ParserState;
use Result;

/// A node address relative to a parser state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Address {
    /// The n-th stack node, from the top.
    Stack(usize),

    /// The n-th queue node, from the front.
    Queue(usize),

    /// The head of the stack top.
    StackHead,

    /// The leftmost dependent of the stack top.
    StackLeftmost,

    /// The rightmost dependent of the stack top.
    StackRightmost,

    /// The leftmost dependent of the first queue node.
    QueueLeftmost,
}

/// An attribute of an addressed node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Attribute {
    Word,
    Pos,
    WordPos,
    Relation,
}

/// One feature template: a conjunction of addressed attributes.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Template {
    parts: Vec<(Address, Attribute)>,
    descriptor: String,
}

/// A feature extractor over addressed templates.
///
/// Templates are written as `+`-joined address/attribute pairs, for
/// example `S0w` (the word of the stack top) or `S0p+N0p` (the tags of
/// the stack top and the first queue node). Supported addresses are
/// `S0`, `S1`, `N0`, `N1`, `N2`, `S0h`, `S0l`, `S0r`, and `N0l`;
/// supported attributes are `w`, `p`, `wp`, and `r`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddressedExtractor {
    templates: Vec<Template>,
}

impl AddressedExtractor {
    pub fn parse<S>(specs: &[S]) -> Result<AddressedExtractor>
    where
        S: AsRef<str>,
    {
        let mut templates = Vec::with_capacity(specs.len());
        for spec in specs {
            templates.push(Self::parse_template(spec.as_ref())?);
        }

        Ok(AddressedExtractor {
            templates: templates,
        })
    }

    fn parse_template(spec: &str) -> Result<Template> {
        let mut parts = Vec::new();
        for part in spec.split('+') {
            parts.push(Self::parse_part(part, spec)?);
        }

        if parts.is_empty() || parts.len() > 4 {
            bail!("template must have between one and four parts: {}", spec);
        }

        Ok(Template {
            parts: parts,
            descriptor: spec.to_owned(),
        })
    }

    fn parse_part(part: &str, spec: &str) -> Result<(Address, Attribute)> {
        let addresses = [
            ("S0h", Address::StackHead),
            ("S0l", Address::StackLeftmost),
            ("S0r", Address::StackRightmost),
            ("N0l", Address::QueueLeftmost),
            ("S0", Address::Stack(0)),
            ("S1", Address::Stack(1)),
            ("N0", Address::Queue(0)),
            ("N1", Address::Queue(1)),
            ("N2", Address::Queue(2)),
        ];

        // Longer addresses are tried first; a part such as `S0r` that
        // fails to yield an attribute falls through to a shorter
        // address (here: the relation of the stack top).
        for &(prefix, address) in &addresses {
            if part.starts_with(prefix) {
                let attribute = match &part[prefix.len()..] {
                    "w" => Some(Attribute::Word),
                    "p" => Some(Attribute::Pos),
                    "wp" => Some(Attribute::WordPos),
                    "r" => Some(Attribute::Relation),
                    _ => None,
                };

                if let Some(attribute) = attribute {
                    return Ok((address, attribute));
                }
            }
        }

        bail!("cannot parse template part '{}' of {}", part, spec)
    }

    fn resolve(state: &ParserState, address: Address) -> Option<usize> {
        match address {
            Address::Stack(n) => state.stack_nth(n),
            Address::Queue(n) => state.queue_nth(n),
            Address::StackHead => state
                .stack_top()
                .and_then(|top| state.head_of(top))
                .map(|(head, _)| head),
            Address::StackLeftmost => state
                .stack_top()
                .and_then(|top| state.leftmost_dependent(top)),
            Address::StackRightmost => state
                .stack_top()
                .and_then(|top| state.rightmost_dependent(top)),
            Address::QueueLeftmost => state
                .queue_front()
                .and_then(|front| state.leftmost_dependent(front)),
        }
    }

    fn attribute(state: &ParserState, node: usize, attribute: Attribute) -> Option<u32> {
        match attribute {
            Attribute::Word => match state.morpheme(node) {
                Some(morpheme) => Some(morpheme.word as u32),
                // The virtual root.
                None => Some(0),
            },
            Attribute::Pos => match state.morpheme(node) {
                Some(morpheme) => Some(morpheme.pos as u32),
                None => Some(0),
            },
            Attribute::WordPos => match state.morpheme(node) {
                Some(morpheme) => Some(morpheme.word_pos as u32),
                None => Some(0),
            },
            Attribute::Relation => state.head_of(node).map(|(_, relation)| relation as u32),
        }
    }

    fn realize(state: &ParserState, template: &Template) -> Option<FeatureValue> {
        let mut components = [0u32; 4];
        for (i, &(address, attribute)) in template.parts.iter().enumerate() {
            let node = Self::resolve(state, address)?;
            components[i] = Self::attribute(state, node, attribute)?;
        }

        Some(match template.parts.len() {
            1 => FeatureValue::One(components[0]),
            2 => FeatureValue::Two(components[0], components[1]),
            3 => FeatureValue::Three(components[0], components[1], components[2]),
            _ => FeatureValue::Four(components[0], components[1], components[2], components[3]),
        })
    }
}

impl FeatureExtractor for AddressedExtractor {
    fn feature_count(&self) -> usize {
        self.templates.len()
    }

    fn features(&self, state: &ParserState) -> FeatureVector {
        self.templates
            .iter()
            .map(|template| Self::realize(state, template))
            .collect()
    }

    fn descriptors(&self) -> Vec<String> {
        self.templates
            .iter()
            .map(|template| template.descriptor.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use features::{FeatureExtractor, FeatureValue};
    use system::{ParserState, Transitions};
    use systems::ArcEagerMorphTransition;
    use testdata::two_token_gold;

    use super::AddressedExtractor;

    #[test]
    fn rejects_malformed_templates() {
        assert!(AddressedExtractor::parse(&["S0q"]).is_err());
        assert!(AddressedExtractor::parse(&["X9w"]).is_err());
        assert!(AddressedExtractor::parse(&["S0w+S0p+N0w+N0p+S1w"]).is_err());
    }

    #[test]
    fn missing_addresses_yield_missing_features() {
        let gold = two_token_gold();
        let extractor = AddressedExtractor::parse(&["S0w", "N0w", "S1w+N0w"]).unwrap();

        let state = Rc::new(ParserState::new(&gold.sentence));
        let features = extractor.features(&state);

        // Nothing is on the stack yet.
        assert_eq!(features[0], None);
        assert_eq!(features[1], Some(FeatureValue::One(2)));
        assert_eq!(features[2], None);
    }

    #[test]
    fn addresses_follow_the_configuration() {
        let gold = two_token_gold();
        let extractor = AddressedExtractor::parse(&["S0w", "N0w", "S0p+N0p"]).unwrap();

        let state = Rc::new(ParserState::new(&gold.sentence));
        let state =
            ParserState::advance(&state, &ArcEagerMorphTransition::Shift, Transitions::SHIFT);
        let features = extractor.features(&state);

        assert_eq!(features[0], Some(FeatureValue::One(2)));
        assert_eq!(features[1], Some(FeatureValue::One(3)));
        assert_eq!(features[2], Some(FeatureValue::Two(1, 2)));
    }

    #[test]
    fn vector_length_equals_feature_count() {
        let gold = two_token_gold();
        let extractor = AddressedExtractor::parse(&["S0w", "N0w", "N1w", "S0hw", "S0r"]).unwrap();

        let mut state = Rc::new(ParserState::new(&gold.sentence));
        loop {
            let features = extractor.features(&state);
            assert_eq!(features.len(), extractor.feature_count());
            if state.queue_is_empty() {
                break;
            }
            state =
                ParserState::advance(&state, &ArcEagerMorphTransition::Shift, Transitions::SHIFT);
        }
    }
}
