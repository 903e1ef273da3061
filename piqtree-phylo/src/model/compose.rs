//! Full substitution model strings such as `GTR+FO+I+R6`.
//!
//! A [`Model`] is a substitution model plus an optional state frequency
//! type, an invariant-sites flag and an optional rate heterogeneity model.
//! Its canonical form is `sub[+freq][+I][+rate]`, and [`make_model`] parses
//! any ordering of the components back into the same value.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use piqtree_core::{PiqtreeError, Result};
use serde::{Deserialize, Serialize};

use super::freq_type::FreqType;
use super::rate_type::{RateModel, RateType};
use super::substitution::{AaModel, DnaModel, SubstitutionModel};

/// Values that resolve to a [`SubstitutionModel`].
pub trait IntoSubstitution {
    fn into_substitution(self) -> Result<SubstitutionModel>;
}

impl IntoSubstitution for SubstitutionModel {
    fn into_substitution(self) -> Result<SubstitutionModel> {
        Ok(self)
    }
}

impl IntoSubstitution for DnaModel {
    fn into_substitution(self) -> Result<SubstitutionModel> {
        Ok(self.into())
    }
}

impl IntoSubstitution for AaModel {
    fn into_substitution(self) -> Result<SubstitutionModel> {
        Ok(self.into())
    }
}

impl IntoSubstitution for &str {
    fn into_substitution(self) -> Result<SubstitutionModel> {
        self.parse()
    }
}

impl IntoSubstitution for String {
    fn into_substitution(self) -> Result<SubstitutionModel> {
        self.parse()
    }
}

/// Values that resolve to a [`FreqType`].
pub trait IntoFreqType {
    fn into_freq_type(self) -> Result<FreqType>;
}

impl IntoFreqType for FreqType {
    fn into_freq_type(self) -> Result<FreqType> {
        Ok(self)
    }
}

impl IntoFreqType for &str {
    fn into_freq_type(self) -> Result<FreqType> {
        self.parse()
    }
}

impl IntoFreqType for String {
    fn into_freq_type(self) -> Result<FreqType> {
        self.parse()
    }
}

/// Values that resolve to a [`RateModel`]. A resolved model passes through
/// unchanged.
pub trait IntoRateModel {
    fn into_rate_model(self) -> Result<RateModel>;
}

impl IntoRateModel for RateModel {
    fn into_rate_model(self) -> Result<RateModel> {
        Ok(self)
    }
}

impl IntoRateModel for &str {
    fn into_rate_model(self) -> Result<RateModel> {
        self.parse()
    }
}

impl IntoRateModel for String {
    fn into_rate_model(self) -> Result<RateModel> {
        self.parse()
    }
}

/// A substitution model with its frequency and rate components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Model {
    substitution: SubstitutionModel,
    freq_type: Option<FreqType>,
    rate_type: RateType,
}

impl Model {
    /// A bare substitution model with no frequency or rate components.
    ///
    /// ```
    /// use piqtree_phylo::model::Model;
    ///
    /// let m = Model::new("GTR").unwrap().with_freq_type("FO").unwrap().with_invariant_sites(true);
    /// assert_eq!(m.to_string(), "GTR+FO+I");
    /// ```
    pub fn new(substitution: impl IntoSubstitution) -> Result<Self> {
        Ok(Self {
            substitution: substitution.into_substitution()?,
            freq_type: None,
            rate_type: RateType::default(),
        })
    }

    /// Build from already resolved components.
    pub fn from_parts(
        substitution: SubstitutionModel,
        freq_type: Option<FreqType>,
        rate_type: RateType,
    ) -> Self {
        Self {
            substitution,
            freq_type,
            rate_type,
        }
    }

    pub fn with_freq_type(mut self, freq_type: impl IntoFreqType) -> Result<Self> {
        self.freq_type = Some(freq_type.into_freq_type()?);
        Ok(self)
    }

    pub fn with_rate_model(mut self, rate_model: impl IntoRateModel) -> Result<Self> {
        self.rate_type.rate_model = Some(rate_model.into_rate_model()?);
        Ok(self)
    }

    pub fn with_invariant_sites(mut self, invariant_sites: bool) -> Self {
        self.rate_type.invariant_sites = invariant_sites;
        self
    }

    pub fn substitution(&self) -> SubstitutionModel {
        self.substitution
    }

    pub fn freq_type(&self) -> Option<FreqType> {
        self.freq_type
    }

    pub fn rate_type(&self) -> RateType {
        self.rate_type
    }

    pub fn rate_model(&self) -> Option<RateModel> {
        self.rate_type.rate_model
    }

    pub fn invariant_sites(&self) -> bool {
        self.rate_type.invariant_sites
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.substitution.iqtree_str())?;
        if let Some(freq) = self.freq_type {
            write!(f, "+{}", freq)?;
        }
        if !self.rate_type.is_empty() {
            write!(f, "+{}", self.rate_type)?;
        }
        Ok(())
    }
}

impl PartialOrd for Model {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Model {
    /// Ordered by canonical string.
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

impl From<SubstitutionModel> for Model {
    fn from(substitution: SubstitutionModel) -> Self {
        Self::from_parts(substitution, None, RateType::default())
    }
}

impl From<DnaModel> for Model {
    fn from(m: DnaModel) -> Self {
        SubstitutionModel::from(m).into()
    }
}

impl From<AaModel> for Model {
    fn from(m: AaModel) -> Self {
        SubstitutionModel::from(m).into()
    }
}

/// Parse an IQ-TREE model string into a [`Model`].
///
/// The substitution model comes before the first `+`. Each following
/// component is classified by its first character: `F` frequency type, `I`
/// invariant sites, `G`/`R` rate heterogeneity. Repeated or unknown
/// components are errors naming the whole input.
pub fn make_model(iqtree_str: &str) -> Result<Model> {
    let Some((sub, components)) = iqtree_str.split_once('+') else {
        return Model::new(iqtree_str);
    };

    let mut freq_type = None;
    let mut invariant_sites = false;
    let mut rate_model = None;

    for component in components.split('+') {
        if component.starts_with('F') {
            if freq_type.is_some() {
                return Err(PiqtreeError::MultipleFrequencySpec(iqtree_str.to_string()));
            }
            freq_type = Some(component);
        } else if component.starts_with('I') {
            if invariant_sites {
                return Err(PiqtreeError::MultipleInvariantSpec(iqtree_str.to_string()));
            }
            invariant_sites = true;
        } else if component.starts_with(['G', 'R']) {
            if rate_model.is_some() {
                return Err(PiqtreeError::MultipleRateSpec(iqtree_str.to_string()));
            }
            rate_model = Some(component);
        } else {
            return Err(PiqtreeError::UnexpectedModelComponent(iqtree_str.to_string()));
        }
    }

    let mut model = Model::new(sub)?.with_invariant_sites(invariant_sites);
    if let Some(freq) = freq_type {
        model = model.with_freq_type(freq)?;
    }
    if let Some(rate) = rate_model {
        model = model.with_rate_model(rate)?;
    }
    Ok(model)
}

impl FromStr for Model {
    type Err = PiqtreeError;

    fn from_str(s: &str) -> Result<Self> {
        make_model(s)
    }
}

impl Serialize for Model {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        make_model(&s).map_err(serde::de::Error::custom)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::select;
    use std::num::NonZeroU32;

    fn substitution() -> impl Strategy<Value = SubstitutionModel> {
        select(SubstitutionModel::all().collect::<Vec<_>>())
    }

    fn rate_model() -> impl Strategy<Value = Option<RateModel>> {
        select(vec![
            None,
            Some(RateModel::DiscreteGamma(None)),
            Some(RateModel::FreeRate(None)),
            Some(RateModel::DiscreteGamma(NonZeroU32::new(6))),
            Some(RateModel::FreeRate(NonZeroU32::new(6))),
        ])
    }

    proptest! {
        #[test]
        fn canonical_string_round_trips(
            sub in substitution(),
            freq in proptest::option::of(select(FreqType::ALL.to_vec())),
            invariant in any::<bool>(),
            rate in rate_model(),
        ) {
            let m = Model::from_parts(sub, freq, RateType::new(invariant, rate));
            let parsed = make_model(&m.to_string()).unwrap();
            prop_assert_eq!(parsed, m);
        }

        #[test]
        fn make_model_does_not_panic(s in "[A-Za-z0-9.+]{0,16}") {
            let _ = make_model(&s);
        }
    }
}
