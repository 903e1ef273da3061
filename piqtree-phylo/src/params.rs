//! Fitted model parameters attached to trees returned by IQ-TREE.
//!
//! Nucleotide rate parameters use IQ-TREE's fixed order `A/C, A/G, A/T, C/G,
//! C/T, G/T`; state frequencies use `A, C, G, T`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Rate parameter names in the order IQ-TREE reports them.
pub const RATE_PARS: [&str; 6] = ["A/C", "A/G", "A/T", "C/G", "C/T", "G/T"];

/// Motif (base) names in the order IQ-TREE reports state frequencies.
pub const MOTIF_PARS: [&str; 4] = ["A", "C", "G", "T"];

/// Parameters carried by a single edge.
///
/// Non-root edges carry the rate parameters implied by the substitution model
/// and the motif probabilities; the root carries only motif probabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeParams {
    pub rates: BTreeMap<String, f64>,
    pub mprobs: Option<BTreeMap<String, f64>>,
}

impl EdgeParams {
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty() && self.mprobs.is_none()
    }
}

/// Full rate and frequency fit of a reversible (non Lie-Markov) DNA model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnaModelFit {
    pub mprobs: BTreeMap<String, f64>,
    pub rates: BTreeMap<String, f64>,
}

/// `model_parameters` of a Lie-Markov fit, as IQ-TREE reported it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LieParameters {
    Scalar(f64),
    List(Vec<f64>),
}

/// Fit of a Lie-Markov DNA model, stored under the native block name
/// (e.g. `ModelLieMarkovRY2.2b`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LieModelFit {
    pub name: String,
    pub mprobs: BTreeMap<String, f64>,
    pub model_parameters: Option<LieParameters>,
}

/// Rate heterogeneity block (e.g. `RateGammaInvar`) copied verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateModelFit {
    pub name: String,
    pub params: serde_yaml::Value,
}

/// Tree-level parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Log-likelihood of the tree under the fitted model.
    pub lnl: Option<f64>,
    /// Raw DNA model fit; consumed when parameters are pushed onto edges.
    pub edge_pars: Option<DnaModelFit>,
    pub lie_model: Option<LieModelFit>,
    pub rate_model: Option<RateModelFit>,
}

/// Zip names with values, failing when the lengths disagree.
pub(crate) fn named_values(names: &[&str], values: &[f64]) -> Option<BTreeMap<String, f64>> {
    if names.len() != values.len() {
        return None;
    }
    Some(
        names
            .iter()
            .map(|n| n.to_string())
            .zip(values.iter().copied())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_values_requires_equal_length() {
        assert!(named_values(&MOTIF_PARS, &[0.25; 3]).is_none());
        let m = named_values(&MOTIF_PARS, &[0.1, 0.2, 0.3, 0.4]).unwrap();
        assert_eq!(m["G"], 0.3);
    }

    #[test]
    fn lie_parameters_deserialize_either_shape() {
        let s: LieParameters = serde_json::from_str("0.48").unwrap();
        assert_eq!(s, LieParameters::Scalar(0.48));
        let l: LieParameters = serde_json::from_str("[1.0, 2.0]").unwrap();
        assert_eq!(l, LieParameters::List(vec![1.0, 2.0]));
    }

    #[test]
    fn default_edge_params_empty() {
        assert!(EdgeParams::default().is_empty());
    }
}
