use std::fmt;

use serde::{Deserialize, Serialize};

/// Type of employer the taxpayer works for.
///
/// Drives both the bonus rate and (together with [`EmploymentType`]) the
/// pension fund contribution rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Organization {
    Government,
    Private,
    Corporate,
}

impl Organization {
    pub fn all() -> &'static [Organization] {
        &[Self::Government, Self::Private, Self::Corporate]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Government => "Government",
            Self::Private => "Private",
            Self::Corporate => "Corporate",
        }
    }

    /// Case-insensitive parse of an organization label.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "government" => Some(Self::Government),
            "private" => Some(Self::Private),
            "corporate" => Some(Self::Corporate),
            _ => None,
        }
    }

    /// Private and corporate employees are always on regular terms.
    pub fn forces_regular_employment(&self) -> bool {
        matches!(self, Self::Private | Self::Corporate)
    }
}

impl fmt::Display for Organization {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EmploymentType {
    Regular,
    Contract,
}

impl EmploymentType {
    pub fn all() -> &'static [EmploymentType] {
        &[Self::Regular, Self::Contract]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::Contract => "Contract",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Some(Self::Regular),
            "contract" => Some(Self::Contract),
            _ => None,
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaritalStatus {
    Married,
    Single,
}

impl MaritalStatus {
    pub fn all() -> &'static [MaritalStatus] {
        &[Self::Married, Self::Single]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Married => "Married",
            Self::Single => "Single",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "married" => Some(Self::Married),
            "single" => Some(Self::Single),
            _ => None,
        }
    }

    pub fn is_married(&self) -> bool {
        matches!(self, Self::Married)
    }
}

impl fmt::Display for MaritalStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
