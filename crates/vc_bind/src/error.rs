use alloc::boxed::Box;

use thiserror::Error;

use crate::bind::BindError;
use crate::converter::ConversionError;
use crate::value::TreeError;

/// The error of the typed helpers of [`ObjectMapper`](crate::ObjectMapper),
/// such as [`from_str`](crate::ObjectMapper::from_str).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Conversion(#[from] Box<ConversionError>),
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl From<ConversionError> for Error {
    #[inline]
    fn from(value: ConversionError) -> Self {
        Self::Conversion(Box::new(value))
    }
}

impl Error {
    /// Returns the conversion error, if this is one.
    pub fn as_conversion(&self) -> Option<&ConversionError> {
        match self {
            Self::Conversion(err) => Some(err),
            _ => None,
        }
    }
}
