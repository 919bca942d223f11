mod error;
pub use error::{Error, IntoError};

pub mod driver;
pub use driver::Driver;

pub mod entity;
pub use entity::Entity;

pub mod schema;
pub use schema::{FieldInfo, FieldKind, TypeInfo};

pub mod value;
pub use value::{ScalarType, Value};

/// A Result type alias that uses rowbind's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
