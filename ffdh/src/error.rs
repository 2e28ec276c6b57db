//! Error type

use core::fmt::{self, Display};

/// Result type with the `ffdh` crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Diffie-Hellman key generation and export errors.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The group modulus could not be bound into Montgomery form.
    Parameters,

    /// The random number generator failed, or no private exponent in range
    /// was drawn within the sampling budget.
    Generation,

    /// The keypair holds no key material.
    MissingKey,

    /// The public value is not a residue modulo the group modulus.
    Extraction,

    /// The public value could not be encoded as bytes.
    Serialization,
}

impl Error {
    /// Nonzero status code for this error, for callers using the
    /// `0 == success` convention.
    pub const fn code(self) -> i32 {
        match self {
            Error::Parameters => 1,
            Error::Generation => 2,
            Error::MissingKey => 3,
            Error::Extraction => 4,
            Error::Serialization => 5,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::Parameters => "failed to bind DH group parameters",
            Error::Generation => "DH key generation failed",
            Error::MissingKey => "DH keypair holds no key material",
            Error::Extraction => "DH public value is not a valid group element",
            Error::Serialization => "failed to serialize DH public value",
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
