//! Zipcode (CEP) normalization and format validation

use std::fmt::{self, Display};

use crate::error::ZipcodeError;

/// Number of digits in a normalized zipcode
pub const ZIPCODE_DIGITS: usize = 8;

/// A zipcode that passed validation, stored without separators
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Zipcode(String);

impl Zipcode {
    /// Strip hyphens and spaces from `raw` and accept exactly 8 ASCII digits.
    pub fn parse(raw: &str) -> Result<Self, ZipcodeError> {
        let normalized = normalize(raw);
        if is_eight_digits(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(ZipcodeError::new(raw))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Zipcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Zipcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Format check used at the HTTP boundary
#[must_use]
pub fn validate(raw: &str) -> bool {
    is_eight_digits(&normalize(raw))
}

fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| *c != '-' && *c != ' ').collect()
}

fn is_eight_digits(value: &str) -> bool {
    value.len() == ZIPCODE_DIGITS && value.bytes().all(|b| b.is_ascii_digit())
}
