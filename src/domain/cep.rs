//! Brazilian postal code (CEP) validation.

use std::fmt;

use thiserror::Error;

/// Number of digits in a CEP.
pub const CEP_LEN: usize = 8;

/// Returned when a string is not a CEP.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid zipcode")]
pub struct InvalidPostalCode;

/// Returns true iff `code` is exactly 8 ASCII decimal digits.
///
/// No normalization happens: `"01001-000"` and `" 01001000"` are rejected.
pub fn is_valid(code: &str) -> bool {
    code.len() == CEP_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

/// A validated CEP.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

impl PostalCode {
    /// Validate and wrap a raw code.
    pub fn parse(raw: &str) -> Result<Self, InvalidPostalCode> {
        if is_valid(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidPostalCode)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for PostalCode {
    type Error = InvalidPostalCode;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}
