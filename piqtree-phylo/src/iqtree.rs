//! High-level IQ-TREE operations.
//!
//! Each function marshals its inputs into the flat form the native library
//! takes, runs the call under [`isolate`], and reconciles the output into
//! domain types. Seeds default to IQ-TREE's "unseeded" value and thread
//! counts to one, except for JC distances which default to all cores.

use std::fmt;
use std::str::FromStr;

use piqtree_core::{PiqtreeError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alignment::Alignment;
use crate::distance::DistanceMatrix;
use crate::model::Model;
use crate::model_finder::ModelFinderResult;
use crate::native::{isolate, IqTreeEngine, UNSEEDED};
use crate::newick;
use crate::reconcile::{apply_edge_parameters, parse_tree_yaml};
use crate::tree::PhyloTree;

/// Options for [`build_tree`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildTreeOptions {
    /// `None` lets IQ-TREE choose a seed.
    pub rand_seed: Option<i32>,
    /// Ultrafast bootstrap replicates; 0 disables bootstrapping. IQ-TREE
    /// requires at least 1000 when enabled.
    pub bootstrap_replicates: u32,
    /// Defaults to 1.
    pub num_threads: Option<u32>,
}

/// Options for [`fit_tree`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitTreeOptions {
    pub rand_seed: Option<i32>,
    /// Defaults to 1.
    pub num_threads: Option<u32>,
}

/// Search space and run settings for [`model_finder`]. Empty sets mean
/// IQ-TREE's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelFinderOptions {
    /// Substitution models to consider (IQ-TREE's `-mset`).
    pub model_set: Vec<String>,
    /// Frequency types to consider (`-mfreq`).
    pub freq_set: Vec<String>,
    /// Rate heterogeneity types to consider (`-mrate`).
    pub rate_set: Vec<String>,
    pub rand_seed: Option<i32>,
    /// Defaults to 1; 0 lets IQ-TREE pick.
    pub num_threads: Option<u32>,
}

/// Process used to generate random trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreeGenMode {
    YuleHarding,
    Uniform,
    Caterpillar,
    Balanced,
    BirthDeath,
    StarTree,
}

impl TreeGenMode {
    pub const ALL: [Self; 6] = [
        Self::YuleHarding,
        Self::Uniform,
        Self::Caterpillar,
        Self::Balanced,
        Self::BirthDeath,
        Self::StarTree,
    ];

    /// The name IQ-TREE expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YuleHarding => "YULE_HARDING",
            Self::Uniform => "UNIFORM",
            Self::Caterpillar => "CATERPILLAR",
            Self::Balanced => "BALANCED",
            Self::BirthDeath => "BIRTH_DEATH",
            Self::StarTree => "STAR_TREE",
        }
    }
}

impl fmt::Display for TreeGenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreeGenMode {
    type Err = PiqtreeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| PiqtreeError::InvalidInput(format!("unknown tree generation mode '{s}'")))
    }
}

fn to_c_int(what: &str, value: u32) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| PiqtreeError::InvalidInput(format!("{what} too large: {value}")))
}

fn threads_or(num_threads: Option<u32>, default: i32) -> Result<i32> {
    num_threads.map_or(Ok(default), |n| to_c_int("num_threads", n))
}

/// Reconstruct a maximum-likelihood tree for `aln` under `model`.
///
/// Tips carry the alignment's names; for reversible DNA models every edge
/// carries the fitted rate and motif parameters.
pub fn build_tree<E>(
    engine: &E,
    aln: &Alignment,
    model: &Model,
    options: &BuildTreeOptions,
) -> Result<PhyloTree>
where
    E: IqTreeEngine + ?Sized,
{
    let rand_seed = options.rand_seed.unwrap_or(UNSEEDED);
    let bootstrap = to_c_int("bootstrap_replicates", options.bootstrap_replicates)?;
    let num_threads = threads_or(options.num_threads, 1)?;
    let model_str = model.to_string();
    debug!(
        model = %model_str,
        taxa = aln.n_sequences(),
        sites = aln.n_columns(),
        rand_seed,
        "build_tree"
    );

    let yaml = isolate("build_tree", true, || {
        engine.build_tree(aln.names(), aln.seqs(), &model_str, rand_seed, bootstrap, num_threads)
    })?;
    let mut tree = parse_tree_yaml(&yaml, aln.names())?;
    apply_edge_parameters(&mut tree, model.substitution())?;
    Ok(tree)
}

/// Fit `model` and branch lengths to the fixed topology of `tree`.
///
/// The tree's tips must be exactly the alignment's names.
pub fn fit_tree<E>(
    engine: &E,
    aln: &Alignment,
    tree: &PhyloTree,
    model: &Model,
    options: &FitTreeOptions,
) -> Result<PhyloTree>
where
    E: IqTreeEngine + ?Sized,
{
    let mut expected: Vec<String> = aln.names().to_vec();
    expected.sort();
    if tree.leaf_names() != expected {
        return Err(PiqtreeError::InvalidInput(
            "tree tips do not match the alignment's sequence names".into(),
        ));
    }

    let rand_seed = options.rand_seed.unwrap_or(UNSEEDED);
    let num_threads = threads_or(options.num_threads, 1)?;
    let model_str = model.to_string();
    let newick = tree.to_newick();
    debug!(model = %model_str, taxa = aln.n_sequences(), rand_seed, "fit_tree");

    let yaml = isolate("fit_tree", true, || {
        engine.fit_tree(aln.names(), aln.seqs(), &model_str, &newick, rand_seed, num_threads)
    })?;
    let mut fitted = parse_tree_yaml(&yaml, aln.names())?;
    apply_edge_parameters(&mut fitted, model.substitution())?;
    Ok(fitted)
}

/// Generate `num_trees` random trees on `num_taxa` taxa.
pub fn random_trees<E>(
    engine: &E,
    num_trees: u32,
    num_taxa: u32,
    mode: TreeGenMode,
    rand_seed: Option<i32>,
) -> Result<Vec<PhyloTree>>
where
    E: IqTreeEngine + ?Sized,
{
    let num_trees = to_c_int("num_trees", num_trees)?;
    let num_taxa = to_c_int("num_taxa", num_taxa)?;
    let rand_seed = rand_seed.unwrap_or(UNSEEDED);
    debug!(num_trees, num_taxa, %mode, rand_seed, "random_trees");

    let output = isolate("random_trees", false, || {
        engine.random_trees(num_taxa, mode.as_str(), num_trees, rand_seed)
    })?;
    newick::parse_many(&output)
}

/// Pairwise Robinson-Foulds distances as a symmetric matrix.
pub fn robinson_foulds<E>(engine: &E, trees: &[PhyloTree]) -> Result<Vec<Vec<i32>>>
where
    E: IqTreeEngine + ?Sized,
{
    let n = trees.len();
    let newicks: Vec<String> = trees.iter().map(PhyloTree::to_newick).collect();
    debug!(trees = n, "robinson_foulds");

    isolate("robinson_foulds", false, || {
        let mut matrix = vec![vec![0; n]; n];
        for i in 1..n {
            for j in 0..i {
                let rf = engine.robinson_foulds(&newicks[i], &newicks[j])?;
                matrix[i][j] = rf;
                matrix[j][i] = rf;
            }
        }
        Ok(matrix)
    })
}

/// Pairwise Jukes-Cantor distances between the alignment's sequences.
/// `num_threads` defaults to 0, meaning all available cores.
pub fn jc_distances<E>(engine: &E, aln: &Alignment, num_threads: Option<u32>) -> Result<DistanceMatrix>
where
    E: IqTreeEngine + ?Sized,
{
    let num_threads = threads_or(num_threads, 0)?;
    let n = aln.n_sequences();
    debug!(taxa = n, num_threads, "jc_distances");

    let flat = isolate("jc_distances", true, || {
        engine.jc_distances(aln.names(), aln.seqs(), num_threads)
    })?;
    if flat.len() != n * n {
        return Err(PiqtreeError::MalformedNativeOutput(format!(
            "expected {} distances, got {}.",
            n * n,
            flat.len()
        )));
    }
    DistanceMatrix::from_square(aln.names().to_vec(), &flat)
}

/// Neighbour-joining tree from a distance matrix. Tips carry the matrix
/// labels.
pub fn nj_tree<E>(engine: &E, distances: &DistanceMatrix) -> Result<PhyloTree>
where
    E: IqTreeEngine + ?Sized,
{
    let flat = distances.to_square();
    debug!(taxa = distances.n(), "nj_tree");
    let newick = isolate("nj_tree", true, || engine.nj_tree(distances.names(), &flat))?;
    PhyloTree::from_newick(newick.trim())
}

/// Run ModelFinder on `aln`.
pub fn model_finder<E>(
    engine: &E,
    aln: &Alignment,
    options: &ModelFinderOptions,
) -> Result<ModelFinderResult>
where
    E: IqTreeEngine + ?Sized,
{
    let rand_seed = options.rand_seed.unwrap_or(UNSEEDED);
    let num_threads = threads_or(options.num_threads, 1)?;
    let model_set = options.model_set.join(",");
    let freq_set = options.freq_set.join(",");
    let rate_set = options.rate_set.join(",");
    debug!(
        taxa = aln.n_sequences(),
        model_set = %model_set,
        freq_set = %freq_set,
        rate_set = %rate_set,
        rand_seed,
        "model_finder"
    );

    let yaml = isolate("model_finder", true, || {
        engine.model_finder(
            aln.names(),
            aln.seqs(),
            rand_seed,
            &model_set,
            &freq_set,
            &rate_set,
            num_threads,
        )
    })?;
    ModelFinderResult::from_yaml(aln.source().unwrap_or("unknown"), &yaml)
}

/// Version string of the linked IQ-TREE library.
pub fn iqtree_version<E>(engine: &E) -> Result<String>
where
    E: IqTreeEngine + ?Sized,
{
    isolate("version", false, || engine.version())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_gen_mode_names() {
        assert_eq!(TreeGenMode::YuleHarding.to_string(), "YULE_HARDING");
        assert_eq!(TreeGenMode::StarTree.as_str(), "STAR_TREE");
        for mode in TreeGenMode::ALL {
            assert_eq!(mode.as_str().parse::<TreeGenMode>().unwrap(), mode);
        }
        assert!("yule_harding".parse::<TreeGenMode>().is_err());
    }

    #[test]
    fn tree_gen_mode_serde_matches_native_name() {
        let json = serde_json::to_string(&TreeGenMode::BirthDeath).unwrap();
        assert_eq!(json, "\"BIRTH_DEATH\"");
    }

    #[test]
    fn options_default_from_empty_config() {
        let opts: BuildTreeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, BuildTreeOptions::default());
        let opts: ModelFinderOptions =
            serde_json::from_str(r#"{"model_set": ["HKY", "TIM"], "rand_seed": 3}"#).unwrap();
        assert_eq!(opts.model_set, ["HKY", "TIM"]);
        assert_eq!(opts.rand_seed, Some(3));
        assert!(opts.num_threads.is_none());
    }

    #[test]
    fn thread_defaults() {
        assert_eq!(threads_or(None, 1).unwrap(), 1);
        assert_eq!(threads_or(None, 0).unwrap(), 0);
        assert_eq!(threads_or(Some(8), 1).unwrap(), 8);
        assert!(threads_or(Some(u32::MAX), 1).is_err());
    }
}
