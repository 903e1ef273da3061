//! State frequency types.

use std::fmt;
use std::str::FromStr;

use piqtree_core::{Annotated, PiqtreeError, Result};
use serde::{Deserialize, Serialize};

/// How equilibrium state frequencies are determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FreqType {
    /// Empirical frequencies counted from the data.
    F,
    /// Frequencies optimised by maximum likelihood. Letter O, not digit zero.
    FO,
    /// Equal frequencies.
    FQ,
}

impl FreqType {
    pub const ALL: [Self; 3] = [Self::F, Self::FO, Self::FQ];

    pub fn iqtree_str(&self) -> &'static str {
        match self {
            Self::F => "F",
            Self::FO => "FO",
            Self::FQ => "FQ",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::F => "Empirical state frequency observed from the data.",
            Self::FO => {
                "State frequency optimized by maximum-likelihood from the data. Note that this is with letter-O and not digit-0."
            }
            Self::FQ => "Equal state frequency.",
        }
    }
}

impl FromStr for FreqType {
    type Err = PiqtreeError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.strip_prefix('+').unwrap_or(s);
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.iqtree_str() == token)
            .ok_or_else(|| PiqtreeError::UnknownFrequencyType(s.to_string()))
    }
}

impl fmt::Display for FreqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.iqtree_str())
    }
}

impl Annotated for FreqType {
    fn name(&self) -> &str {
        self.iqtree_str()
    }

    fn description(&self) -> Option<&str> {
        Some(FreqType::description(self))
    }
}
