//! Biological sex classifier.
//!
//! Free-text or coded input is normalised to one of four canonical values. Parsing never fails.
//! Anything that is not recognised becomes [`Sex::NotGiven`].

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Sex {
    Unknown,
    Male,
    Female,
    #[default]
    NotGiven,
}

impl Sex {
    /// Canonical values in their fixed listing order.
    pub const ALL: [Sex; 4] = [Sex::Unknown, Sex::Male, Sex::Female, Sex::NotGiven];

    /// Normalises free-text input.
    ///
    /// `m`/`f` in any case map to male/female; otherwise the trimmed input is compared
    /// case-insensitively against the canonical names.
    pub fn parse(input: Option<&str>) -> Sex {
        let Some(trimmed) = input.map(str::trim).filter(|s| !s.is_empty()) else {
            return Sex::NotGiven;
        };

        if trimmed.eq_ignore_ascii_case("m") {
            return Sex::Male;
        }
        if trimmed.eq_ignore_ascii_case("f") {
            return Sex::Female;
        }

        Sex::ALL
            .into_iter()
            .find(|sex| sex.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or(Sex::NotGiven)
    }

    /// Display names of [`Sex::ALL`], for allow-lists and pickers.
    pub fn canonical_names() -> [&'static str; 4] {
        Sex::ALL.map(Sex::as_str)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Unknown => "Unknown",
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::NotGiven => "Not Given",
        }
    }

    /// Stable numeric code, matching the position in [`Sex::ALL`].
    pub fn code(self) -> u8 {
        match self {
            Sex::Unknown => 0,
            Sex::Male => 1,
            Sex::Female => 2,
            Sex::NotGiven => 3,
        }
    }

    pub fn is_male(self) -> bool {
        self == Sex::Male
    }

    pub fn is_female(self) -> bool {
        self == Sex::Female
    }

    pub fn is_unknown(self) -> bool {
        self == Sex::Unknown
    }

    pub fn is_not_given(self) -> bool {
        self == Sex::NotGiven
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Sex::parse(Some(s)))
    }
}

impl From<&str> for Sex {
    fn from(value: &str) -> Self {
        Sex::parse(Some(value))
    }
}

impl From<Option<&str>> for Sex {
    fn from(value: Option<&str>) -> Self {
        Sex::parse(value)
    }
}

impl serde::Serialize for Sex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Sex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Sex::parse(raw.as_deref()))
    }
}
