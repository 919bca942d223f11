use super::{Error, ErrorKind};

/// A free-form error built from a message, used by the `bail!`/`err!` macros.
#[derive(Debug)]
pub(super) struct AdhocError {
    message: Box<str>,
}

impl std::error::Error for AdhocError {}

impl core::fmt::Display for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error {
    /// Creates an error from preformatted arguments.
    pub fn from_args(args: core::fmt::Arguments<'_>) -> Error {
        match args.as_str() {
            Some(message) => Error::adhoc(message),
            None => Error::adhoc(std::fmt::format(args)),
        }
    }

    /// Creates a free-form error from a message.
    pub fn adhoc(message: impl Into<String>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError {
            message: message.into().into_boxed_str(),
        }))
    }
}
