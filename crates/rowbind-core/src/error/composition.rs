use super::Error;

/// Error raised while composing a batch script when a non-nullable
/// parameter holds no value and therefore cannot be written as a literal.
#[derive(Debug)]
pub(super) struct CompositionError {
    parameter: Box<str>,
}

impl std::error::Error for CompositionError {}

impl core::fmt::Display for CompositionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "cannot compose non-nullable parameter `{}` from a null value",
            self.parameter
        )
    }
}

impl Error {
    /// Creates a composition error for the named parameter.
    pub fn composition(parameter: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Composition(CompositionError {
            parameter: parameter.into().into_boxed_str(),
        }))
    }

    /// Returns `true` if this error is a composition error.
    pub fn is_composition(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Composition(_))
    }
}
