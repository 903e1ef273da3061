//! Boundary to the IQ-TREE native library.
//!
//! [`IqTreeEngine`] is the opaque function set the library exposes. Every
//! argument is flat (names, sequences, model strings, integers) and every
//! result is a string, an integer or a flat vector of doubles. Failures
//! raised inside the library surface as
//! [`PiqtreeError::NativeEngineFailure`](piqtree_core::PiqtreeError) carrying
//! the native message unmodified.
//!
//! [`NativeLibrary`] links against `libiqtree2` and is only available with
//! the `native` feature. Calls should go through [`isolate`], which
//! serialises them and hides the library's console and file output.

mod isolate;

#[cfg(feature = "native")]
mod ffi;

pub use isolate::isolate;

#[cfg(feature = "native")]
pub use ffi::NativeLibrary;

use piqtree_core::Result;

/// Seed value meaning "let IQ-TREE pick one".
pub const UNSEEDED: i32 = 0;

/// The functions provided by the IQ-TREE library.
///
/// Sequences are passed as parallel `names`/`seqs` slices of equal length.
/// Implementations must be `Send + Sync`; callers are still expected to
/// serialise calls through [`isolate`] because the library itself is not
/// re-entrant.
pub trait IqTreeEngine: Send + Sync {
    /// Maximum-likelihood tree search. Returns IQ-TREE's YAML report.
    fn build_tree(
        &self,
        names: &[String],
        seqs: &[String],
        model: &str,
        rand_seed: i32,
        bootstrap_replicates: i32,
        num_threads: i32,
    ) -> Result<String>;

    /// Fit model parameters and branch lengths to a fixed topology. Returns
    /// IQ-TREE's YAML report.
    fn fit_tree(
        &self,
        names: &[String],
        seqs: &[String],
        model: &str,
        newick: &str,
        rand_seed: i32,
        num_threads: i32,
    ) -> Result<String>;

    /// Newline separated Newick trees.
    fn random_trees(
        &self,
        num_taxa: i32,
        tree_gen_mode: &str,
        num_trees: i32,
        rand_seed: i32,
    ) -> Result<String>;

    fn robinson_foulds(&self, tree1: &str, tree2: &str) -> Result<i32>;

    /// Row-major `n * n` Jukes-Cantor distances.
    fn jc_distances(&self, names: &[String], seqs: &[String], num_threads: i32) -> Result<Vec<f64>>;

    /// Neighbour-joining tree from a row-major `n * n` distance matrix.
    fn nj_tree(&self, names: &[String], distances: &[f64]) -> Result<String>;

    /// ModelFinder. Sets are comma separated, empty for IQ-TREE's defaults.
    #[allow(clippy::too_many_arguments)]
    fn model_finder(
        &self,
        names: &[String],
        seqs: &[String],
        rand_seed: i32,
        model_set: &str,
        freq_set: &str,
        rate_set: &str,
        num_threads: i32,
    ) -> Result<String>;

    fn version(&self) -> Result<String>;
}
