//! Rate heterogeneity across sites: discrete Gamma, FreeRate and invariant
//! sites.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use piqtree_core::{PiqtreeError, Result};
use serde::{Deserialize, Serialize};

/// A rate heterogeneity model with an optional number of rate categories.
///
/// An unset category count means "IQ-TREE's default"; it is kept unset and
/// rendered without a number, never as an explicit `4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateModel {
    /// Discrete Gamma model (Yang, 1994), `+G`.
    DiscreteGamma(Option<NonZeroU32>),
    /// FreeRate model (Yang, 1995; Soubrier et al., 2012), `+R`.
    FreeRate(Option<NonZeroU32>),
}

impl RateModel {
    pub fn rate_categories(&self) -> Option<NonZeroU32> {
        match self {
            Self::DiscreteGamma(n) | Self::FreeRate(n) => *n,
        }
    }

    fn letter(&self) -> char {
        match self {
            Self::DiscreteGamma(_) => 'G',
            Self::FreeRate(_) => 'R',
        }
    }

    pub fn iqtree_str(&self) -> String {
        match self.rate_categories() {
            Some(n) => format!("{}{}", self.letter(), n),
            None => self.letter().to_string(),
        }
    }
}

impl FromStr for RateModel {
    type Err = PiqtreeError;

    /// Parse `G`, `+G`, `G8`, `+R42` and the like.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || PiqtreeError::InvalidRateModel(s.to_string());
        let stripped = s.strip_prefix('+').unwrap_or(s);
        let mut chars = stripped.chars();
        let letter = chars.next().ok_or_else(invalid)?;
        let digits = chars.as_str();

        let categories = if digits.is_empty() {
            None
        } else {
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            Some(digits.parse::<NonZeroU32>().map_err(|_| invalid())?)
        };

        match letter {
            'G' => Ok(Self::DiscreteGamma(categories)),
            'R' => Ok(Self::FreeRate(categories)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for RateModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iqtree_str())
    }
}

/// Invariant sites combined with an optional rate heterogeneity model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateType {
    pub invariant_sites: bool,
    pub rate_model: Option<RateModel>,
}

impl RateType {
    pub fn new(invariant_sites: bool, rate_model: Option<RateModel>) -> Self {
        Self {
            invariant_sites,
            rate_model,
        }
    }

    /// True when neither invariant sites nor a rate model is set.
    pub fn is_empty(&self) -> bool {
        !self.invariant_sites && self.rate_model.is_none()
    }

    /// `I`, `G4`, `I+R`, ... or the empty string.
    pub fn iqtree_str(&self) -> String {
        let mut s = String::new();
        if self.invariant_sites {
            s.push('I');
        }
        if let Some(rate_model) = self.rate_model {
            if self.invariant_sites {
                s.push('+');
            }
            s.push_str(&rate_model.iqtree_str());
        }
        s
    }

    /// The rate types offered in the option tables, without category counts.
    pub fn all_base() -> [RateType; 6] {
        [
            RateType::new(false, None),
            RateType::new(true, None),
            RateType::new(false, Some(RateModel::DiscreteGamma(None))),
            RateType::new(true, Some(RateModel::DiscreteGamma(None))),
            RateType::new(false, Some(RateModel::FreeRate(None))),
            RateType::new(true, Some(RateModel::FreeRate(None))),
        ]
    }

    /// Description keyed on the rate type ignoring its category count.
    pub fn description(&self) -> &'static str {
        let rate_model = self.rate_model.map(|m| match m {
            RateModel::DiscreteGamma(_) => 'G',
            RateModel::FreeRate(_) => 'R',
        });
        match (self.invariant_sites, rate_model) {
            (false, None) => "no invariable sites, no rate heterogeneity model.",
            (true, None) => "allowing for a proportion of invariable sites.",
            (false, Some('G')) => {
                "discrete Gamma model (Yang, 1994) with default 4 rate categories. The number of categories can be changed with e.g. +G8."
            }
            (true, Some('G')) => "invariable site plus discrete Gamma model (Gu et al., 1995).",
            (false, _) => {
                "FreeRate model (Yang, 1995; Soubrier et al., 2012) that generalizes the +G model by relaxing the assumption of Gamma-distributed rates. The number of categories can be specified with e.g. +R6 (default 4 categories if not specified). The FreeRate model typically fits data better than the +G model and is recommended for analysis of large data sets."
            }
            (true, _) => "invariable site plus FreeRate model.",
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iqtree_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: u32) -> Option<NonZeroU32> {
        NonZeroU32::new(v)
    }

    #[test]
    fn parse_without_count() {
        assert_eq!("G".parse::<RateModel>().unwrap(), RateModel::DiscreteGamma(None));
        assert_eq!("+R".parse::<RateModel>().unwrap(), RateModel::FreeRate(None));
    }

    #[test]
    fn parse_with_count() {
        assert_eq!("G8".parse::<RateModel>().unwrap(), RateModel::DiscreteGamma(n(8)));
        assert_eq!("+R42".parse::<RateModel>().unwrap(), RateModel::FreeRate(n(42)));
    }

    #[test]
    fn absent_count_is_not_four() {
        let absent = RateModel::DiscreteGamma(None);
        let four = RateModel::DiscreteGamma(n(4));
        assert_ne!(absent, four);
        assert_eq!(absent.iqtree_str(), "G");
        assert_eq!(four.iqtree_str(), "G4");
    }

    #[test]
    fn invalid_shapes_rejected() {
        for bad in ["", "+", "X", "Gx", "G+8", "G-1", "R0", "GG", "I"] {
            let err = bad.parse::<RateModel>().unwrap_err();
            assert!(
                matches!(err, PiqtreeError::InvalidRateModel(ref s) if s == bad),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn rate_type_strings() {
        assert_eq!(RateType::default().iqtree_str(), "");
        assert_eq!(RateType::new(true, None).iqtree_str(), "I");
        assert_eq!(
            RateType::new(true, Some(RateModel::FreeRate(n(6)))).iqtree_str(),
            "I+R6"
        );
        assert_eq!(
            RateType::new(false, Some(RateModel::DiscreteGamma(None))).iqtree_str(),
            "G"
        );
    }

    #[test]
    fn descriptions_ignore_category_count() {
        let a = RateType::new(true, Some(RateModel::DiscreteGamma(n(8))));
        let b = RateType::new(true, Some(RateModel::DiscreteGamma(None)));
        assert_eq!(a.description(), b.description());
        assert!(RateType::all_base().iter().all(|r| !r.description().is_empty()));
    }
}
