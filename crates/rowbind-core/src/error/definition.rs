use super::Error;

/// Error raised when a type's declared roles or overrides are inconsistent
/// with the type itself.
///
/// Definition errors are fatal for the type pair that triggered them and
/// surface on the first resolution that touches the bad declaration: an
/// input field that is not readable, an output field that is not writable,
/// or an override bound to a field the target does not have.
#[derive(Debug)]
pub(super) struct DefinitionError {
    message: Box<str>,
}

impl std::error::Error for DefinitionError {}

impl core::fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid definition: {}", self.message)
    }
}

impl Error {
    /// Creates a definition error.
    pub fn definition(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Definition(DefinitionError {
            message: message.into().into_boxed_str(),
        }))
    }

    /// Returns `true` if this error is a definition error.
    pub fn is_definition(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Definition(_))
    }
}
