use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A scheme-qualified content address, `scheme://identifier`.
///
/// Locators are opaque and immutable once issued by a backend. Equality is
/// textual, which under content addressing means two equal locators address
/// identical content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locator {
    scheme: String,
    identifier: String,
}

impl Locator {
    pub fn new(scheme: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            identifier: identifier.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.identifier)
    }
}

impl FromStr for Locator {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (scheme, identifier) = value
            .split_once("://")
            .ok_or_else(|| Error::InvalidLocator(value.to_string()))?;

        if scheme.is_empty() || identifier.is_empty() {
            return Err(Error::InvalidLocator(value.to_string()));
        }

        Ok(Self::new(scheme, identifier))
    }
}

impl TryFrom<String> for Locator {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locator> for String {
    fn from(value: Locator) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod from_str {
        use super::*;

        #[test]
        fn should_parse_scheme_and_identifier() {
            let locator: Locator = "file://abc123.json".parse().unwrap();

            assert_eq!(locator.scheme(), "file");
            assert_eq!(locator.identifier(), "abc123.json");
        }

        #[test]
        fn should_reject_missing_separator() {
            let result = "file-abc123".parse::<Locator>();

            assert!(matches!(result, Err(Error::InvalidLocator(_))));
        }

        #[test]
        fn should_reject_empty_identifier() {
            let result = "ipfs://".parse::<Locator>();

            assert!(matches!(result, Err(Error::InvalidLocator(_))));
        }
    }

    mod display {
        use super::*;

        #[test]
        fn should_round_trip_through_string_form() {
            let locator = Locator::new("ipfs", "QmZ4tDuvesekSs4qM5ZBKpXiZGun7S2CYtEZRB3DYXkjGx");

            let round_tripped: Locator = locator.to_string().parse().unwrap();

            assert_eq!(round_tripped, locator);
        }
    }
}
