/// Errors that can occur during parsing and training.
#[derive(Clone, Debug, Eq, Fail, PartialEq)]
pub enum ParserError {
    /// The oracle cannot produce a transition that leads to the gold
    /// analysis. This is expected behavior on non-projective input.
    #[fail(display = "oracle cannot reach the gold analysis: {}", _0)]
    OracleUnreachable(String),

    /// The lattice does not contain a path that matches the gold
    /// morpheme sequence.
    #[fail(display = "lattice has no path matching the gold morphemes")]
    MissingGoldPath,

    /// No transition was applicable in a non-terminal configuration.
    /// This cannot arise from data and indicates an incorrectly
    /// configured transition system.
    #[fail(display = "no applicable transition in a non-terminal configuration")]
    ExhaustedTransitions,

    /// A serialized model used an unknown version tag.
    #[fail(display = "unsupported model version: {}", _0)]
    UnsupportedModelVersion(u32),
}

impl ParserError {
    /// Returns `true` for errors that a training loop may recover from
    /// by skipping the offending instance.
    pub fn is_recoverable(&self) -> bool {
        match *self {
            ParserError::OracleUnreachable(_) | ParserError::MissingGoldPath => true,
            _ => false,
        }
    }
}
