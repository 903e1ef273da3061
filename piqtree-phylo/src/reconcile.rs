//! Turning IQ-TREE's YAML report into an annotated [`PhyloTree`].
//!
//! The report names taxa by their index into the input alignment and keeps
//! the log-likelihood only in `CandidateSet`, keyed by the candidate's own
//! Newick rendering. The chosen tree is matched against the candidates by
//! tip-to-tip distances rather than by text, since IQ-TREE may root or order
//! the same tree differently in the two places.

use std::collections::BTreeMap;

use piqtree_core::{PiqtreeError, Result};
use serde_yaml::Value;
use tracing::debug;

use crate::model::{DnaModel, SubstitutionModel};
use crate::params::{
    named_values, DnaModelFit, EdgeParams, LieModelFit, LieParameters, RateModelFit,
    MOTIF_PARS, RATE_PARS,
};
use crate::tree::{distances_close, PhyloTree};

/// Relative tolerance when comparing candidate distance matrices.
pub const CANDIDATE_RTOL: f64 = 1e-5;
/// Absolute tolerance when comparing candidate distance matrices.
pub const CANDIDATE_ATOL: f64 = 1e-8;

fn malformed(what: &str) -> PiqtreeError {
    PiqtreeError::MalformedNativeOutput(what.to_string())
}

/// Parse the YAML text returned by a tree building call and reconcile it.
pub fn parse_tree_yaml(text: &str, names: &[String]) -> Result<PhyloTree> {
    let yaml: Value = serde_yaml::from_str(text)
        .map_err(|e| PiqtreeError::Parse(format!("IQ-TREE YAML: {e}")))?;
    process_tree_yaml(&yaml, names)
}

/// Build the annotated tree described by an IQ-TREE YAML report.
///
/// Attaches the log-likelihood, the DNA model fit (`ModelDNA` or a
/// `ModelLieMarkov*` block) and the first `Rate*` block, then renames tips
/// from their numeric placeholders to `names`.
pub fn process_tree_yaml(yaml: &Value, names: &[String]) -> Result<PhyloTree> {
    let newick = yaml
        .get("PhyloTree")
        .and_then(|t| t.get("newick"))
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("tree not found."))?;
    let mut tree = PhyloTree::from_newick(newick)?;

    let lnl = match_candidate(&tree, yaml.get("CandidateSet"))?;
    tree.params_mut().lnl = Some(lnl);

    if let Some(fit) = yaml.get("ModelDNA") {
        tree.params_mut().edge_pars = Some(parse_dna_fit(fit)?);
    } else if let Some((name, fit)) = find_block(yaml, "ModelLieMarkov") {
        tree.params_mut().lie_model = Some(parse_lie_fit(name, fit)?);
    }

    if let Some((name, params)) = find_block(yaml, "Rate") {
        tree.params_mut().rate_model = Some(RateModelFit {
            name: name.to_string(),
            params: params.clone(),
        });
    }

    tree.rename_tips(|label| {
        label
            .parse::<usize>()
            .ok()
            .and_then(|i| names.get(i))
            .cloned()
            .ok_or_else(|| {
                PiqtreeError::MalformedNativeOutput(format!(
                    "tip label '{}' is not an index into {} sequence names.",
                    label,
                    names.len()
                ))
            })
    })?;

    debug!(tips = tree.leaf_count(), lnl, "reconciled IQ-TREE tree");
    Ok(tree)
}

/// Log-likelihood of the first candidate whose tip distances match `tree`.
fn match_candidate(tree: &PhyloTree, candidates: Option<&Value>) -> Result<f64> {
    let Some(candidates) = candidates.and_then(Value::as_mapping) else {
        return Err(malformed("likelihood not found."));
    };
    let (labels, distances) = tree
        .tip_to_tip_distances()
        .map_err(|e| malformed(&format!("tree tips unusable: {e}")))?;
    for (key, candidate) in candidates {
        let Some((lnl, newick)) = candidate.as_str().and_then(|c| c.trim().split_once(' ')) else {
            continue;
        };
        let Ok(candidate_tree) = PhyloTree::from_newick(newick.trim()) else {
            continue;
        };
        let (candidate_labels, candidate_distances) = match candidate_tree.tip_to_tip_distances() {
            Ok(d) => d,
            Err(e) => {
                debug!(candidate = ?key, error = %e, "skipping candidate tree");
                continue;
            }
        };
        if candidate_labels == labels
            && distances_close(&distances, &candidate_distances, CANDIDATE_RTOL, CANDIDATE_ATOL)
        {
            return lnl
                .parse::<f64>()
                .map_err(|_| malformed("likelihood not found."));
        }
    }
    Err(malformed("likelihood not found."))
}

/// First top-level key starting with `prefix`, in document order.
fn find_block<'a>(yaml: &'a Value, prefix: &str) -> Option<(&'a str, &'a Value)> {
    yaml.as_mapping()?
        .iter()
        .find_map(|(k, v)| k.as_str().filter(|k| k.starts_with(prefix)).map(|k| (k, v)))
}

/// A comma separated list of numbers, or a YAML sequence of numbers.
/// Empty strings count as absent.
fn float_list(value: Option<&Value>) -> Option<Vec<f64>> {
    match value? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => s.split(',').map(|v| v.trim().parse::<f64>().ok()).collect(),
        Value::Sequence(seq) => seq.iter().map(Value::as_f64).collect(),
        Value::Number(n) => n.as_f64().map(|v| vec![v]),
        _ => None,
    }
}

fn parse_mprobs(fit: &Value) -> Result<BTreeMap<String, f64>> {
    float_list(fit.get("state_freq"))
        .and_then(|v| named_values(&MOTIF_PARS, &v))
        .ok_or_else(|| malformed("motif parameters not found."))
}

fn parse_dna_fit(fit: &Value) -> Result<DnaModelFit> {
    let mprobs = parse_mprobs(fit)?;
    let rates = float_list(fit.get("rates"))
        .and_then(|v| named_values(&RATE_PARS, &v))
        .ok_or_else(|| malformed("rate parameters not found."))?;
    Ok(DnaModelFit { mprobs, rates })
}

fn parse_lie_fit(name: &str, fit: &Value) -> Result<LieModelFit> {
    let mprobs = parse_mprobs(fit)?;
    // Absent for models with a constant rate, e.g. 1.1.
    let model_parameters = match fit.get("model_parameters") {
        None => None,
        Some(Value::Number(n)) => n.as_f64().map(LieParameters::Scalar),
        Some(other) => float_list(Some(other)).map(LieParameters::List),
    };
    Ok(LieModelFit {
        name: name.to_string(),
        mprobs,
        model_parameters,
    })
}

/// The rate parameters a nucleotide model actually has, named as cogent3
/// names them.
///
/// JC and F81 have none; K80 and HKY keep `kappa` (A/G); TN keeps `kappa_r`
/// (A/G) and `kappa_y` (C/T); GTR drops the reference rate G/T. Every other
/// model keeps all six.
pub fn reduce_rate_parameters(
    model: SubstitutionModel,
    rates: &BTreeMap<String, f64>,
) -> Result<BTreeMap<String, f64>> {
    let rate = |key: &str| {
        rates
            .get(key)
            .copied()
            .ok_or_else(|| PiqtreeError::MalformedNativeOutput(format!("rate {key} not found.")))
    };
    let reduced = match model.as_dna() {
        Some(DnaModel::JC | DnaModel::F81) => BTreeMap::new(),
        Some(DnaModel::K80 | DnaModel::HKY) => BTreeMap::from([("kappa".to_string(), rate("A/G")?)]),
        Some(DnaModel::TN) => BTreeMap::from([
            ("kappa_r".to_string(), rate("A/G")?),
            ("kappa_y".to_string(), rate("C/T")?),
        ]),
        Some(DnaModel::GTR) => {
            let mut all = rates.clone();
            all.remove("G/T");
            all
        }
        _ => rates.clone(),
    };
    Ok(reduced)
}

/// Push the tree's DNA model fit onto its edges.
///
/// Every non-root edge receives the reduced rate parameters and the motif
/// probabilities; the root receives only the motif probabilities. The raw
/// fit is removed from the tree. Trees without a `ModelDNA` fit are left
/// unchanged.
pub fn apply_edge_parameters(tree: &mut PhyloTree, model: SubstitutionModel) -> Result<()> {
    let Some(fit) = tree.params_mut().edge_pars.take() else {
        return Ok(());
    };
    let rates = reduce_rate_parameters(model, &fit.rates)?;
    let root = tree.root();
    let ids: Vec<_> = tree.iter_preorder().collect();
    for id in ids {
        if let Some(node) = tree.get_node_mut(id) {
            node.params = EdgeParams {
                rates: if id == root { BTreeMap::new() } else { rates.clone() },
                mprobs: Some(fit.mprobs.clone()),
            };
        }
    }
    Ok(())
}
