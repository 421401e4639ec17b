//! Brazilian postal code (CEP) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PostalCodeError {
    /// The input contains no digits at all.
    #[error("postal code cannot be empty")]
    Empty,
    /// The input does not contain exactly eight digits.
    #[error("postal code must have {expected} digits (got {found})")]
    WrongLength {
        /// Required digit count.
        expected: usize,
        /// Digit count found after stripping non-digits.
        found: usize,
    },
}

/// A postal code, stored as its eight digits.
///
/// Parsing strips every non-digit character first, so `01310-930`,
/// `01310930` and ` 01.310-930 ` all parse to the same value.
///
/// ## Examples
///
/// ```
/// use vitrine_core::PostalCode;
///
/// let cep = PostalCode::parse("01310-930").unwrap();
/// assert_eq!(cep.as_str(), "01310930");
/// assert_eq!(cep.formatted(), "01310-930");
///
/// assert!(PostalCode::parse("123").is_err());
/// assert!(PostalCode::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    /// Number of digits in a postal code.
    pub const DIGITS: usize = 8;

    /// Parse a `PostalCode` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input has no digits or does not contain
    /// exactly eight digits once non-digits are removed.
    pub fn parse(s: &str) -> Result<Self, PostalCodeError> {
        let digits = digits_only(s);

        if digits.is_empty() {
            return Err(PostalCodeError::Empty);
        }

        if digits.len() != Self::DIGITS {
            return Err(PostalCodeError::WrongLength {
                expected: Self::DIGITS,
                found: digits.len(),
            });
        }

        Ok(Self(digits))
    }

    /// Returns the eight digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PostalCode` and returns its digits.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the code formatted as `NNNNN-NNN`.
    #[must_use]
    pub fn formatted(&self) -> String {
        let (head, tail) = self.0.split_at(5.min(self.0.len()));
        format!("{head}-{tail}")
    }
}

/// Keep only the ASCII digits of `s`.
#[must_use]
pub fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PostalCode {
    type Err = PostalCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
