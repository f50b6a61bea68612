//! Maven-style library coordinates and the stub names derived from them.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::module_id::{ModuleId, STUB_NAME_PREFIX};

static STUB_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^stubs#([^#]+)#([^#]+)#([^#]+)$").expect("stub name pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatesError {
    #[error("invalid coordinates `{0}`, expected `group:artifact:version`")]
    InvalidCoordinates(String),

    #[error("`{0}` is not a stub solution name")]
    NotAStubName(String),
}

/// `group:artifact:version` of an external library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinates {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Coordinates {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Coordinates {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// Name of the stub solution wrapping this library.
    pub fn stub_name(&self) -> String {
        format!(
            "{}{}#{}#{}",
            STUB_NAME_PREFIX, self.group, self.artifact, self.version
        )
    }

    /// Id of the stub solution wrapping this library.
    pub fn stub_id(&self) -> ModuleId {
        ModuleId::for_stub(&self.stub_name())
    }

    /// Recover coordinates from a stub solution name.
    pub fn from_stub_name(name: &str) -> Result<Self, CoordinatesError> {
        let captures = STUB_NAME
            .captures(name)
            .ok_or_else(|| CoordinatesError::NotAStubName(name.to_string()))?;
        Ok(Coordinates::new(&captures[1], &captures[2], &captures[3]))
    }
}

impl FromStr for Coordinates {
    type Err = CoordinatesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            [group, artifact, version]
                if !group.is_empty() && !artifact.is_empty() && !version.is_empty() =>
            {
                Ok(Coordinates::new(*group, *artifact, *version))
            }
            _ => Err(CoordinatesError::InvalidCoordinates(s.to_string())),
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_name_and_id() {
        let coords: Coordinates = "org.slf4j:slf4j-api:1.7.30".parse().unwrap();
        assert_eq!(coords.stub_name(), "stubs#org.slf4j#slf4j-api#1.7.30");
        assert_eq!(coords.stub_id().as_str(), "~stubs#org.slf4j#slf4j-api#1.7.30");
        assert_eq!(coords.stub_id(), coords.clone().stub_id());
    }

    #[test]
    fn test_from_stub_name() {
        let coords = Coordinates::from_stub_name("stubs#org.slf4j#slf4j-api#1.7.30").unwrap();
        assert_eq!(coords, Coordinates::new("org.slf4j", "slf4j-api", "1.7.30"));
        assert!(Coordinates::from_stub_name("org.example.sol").is_err());
        assert!(Coordinates::from_stub_name("stubs#a#b").is_err());
    }

    #[test]
    fn test_stub_name_round_trips_coordinates() {
        for text in ["com.google.guava:guava:31.0", "org.slf4j:slf4j-api:1.7.30-SNAPSHOT"] {
            let coords: Coordinates = text.parse().unwrap();
            assert_eq!(Coordinates::from_stub_name(&coords.stub_name()).unwrap(), coords);
        }
        assert!(matches!(
            Coordinates::from_stub_name("stubs#a#b#c#d"),
            Err(CoordinatesError::NotAStubName(_))
        ));
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!("a:b".parse::<Coordinates>().is_err());
        assert!("a::c".parse::<Coordinates>().is_err());
        assert!("a:b:c:d".parse::<Coordinates>().is_err());
    }
}
