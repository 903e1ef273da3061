//! Python bindings for the IQ-TREE operations.

use std::collections::BTreeMap;

use piqtree_phylo::{
    self as phylo, Alignment, BuildTreeOptions, DistanceMatrix, FitTreeOptions,
    ModelFinderOptions, NativeLibrary, TreeGenMode,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::error::IntoPyResult;
use crate::model::{Model, ModelArg};

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// A phylogenetic tree, optionally carrying fitted model parameters.
#[pyclass(frozen, module = "piqtree.phylo")]
pub struct Tree {
    inner: phylo::PhyloTree,
}

#[pymethods]
impl Tree {
    #[staticmethod]
    fn from_newick(newick: &str) -> PyResult<Self> {
        phylo::PhyloTree::from_newick(newick)
            .map(|inner| Self { inner })
            .into_pyresult()
    }

    fn leaf_count(&self) -> usize {
        self.inner.leaf_count()
    }

    /// Sorted list of leaf names.
    fn leaf_names(&self) -> Vec<String> {
        self.inner.leaf_names()
    }

    fn to_newick(&self) -> String {
        self.inner.to_newick()
    }

    /// Log-likelihood of the fitted tree, if any.
    #[getter]
    fn lnl(&self) -> Option<f64> {
        self.inner.lnl()
    }

    /// The whole tree with its parameters as a JSON document.
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner)
            .map_err(|e| PyValueError::new_err(format!("cannot serialize tree: {e}")))
    }

    fn __repr__(&self) -> String {
        format!("Tree(leaves={})", self.inner.leaf_count())
    }

    fn __len__(&self) -> usize {
        self.inner.leaf_count()
    }
}

impl From<phylo::PhyloTree> for Tree {
    fn from(inner: phylo::PhyloTree) -> Self {
        Self { inner }
    }
}

// ---------------------------------------------------------------------------
// ModelFinder result
// ---------------------------------------------------------------------------

/// Statistics and best models from a ModelFinder run.
#[pyclass(frozen, module = "piqtree.phylo")]
pub struct ModelFinderResult {
    inner: phylo::ModelFinderResult,
}

#[pymethods]
impl ModelFinderResult {
    #[getter]
    fn source(&self) -> &str {
        self.inner.source()
    }

    #[getter]
    fn best_aic(&self) -> Model {
        self.inner.best_aic().into()
    }

    #[getter]
    fn best_aicc(&self) -> Model {
        self.inner.best_aicc().into()
    }

    #[getter]
    fn best_bic(&self) -> Model {
        self.inner.best_bic().into()
    }

    /// `{model string: (lnl, nfp, tree_length)}`.
    #[getter]
    fn model_stats(&self) -> BTreeMap<String, (f64, i64, f64)> {
        self.inner
            .model_stats()
            .iter()
            .map(|(m, v)| (m.to_string(), v))
            .chain(
                self.inner
                    .unresolved_stats()
                    .iter()
                    .map(|(name, v)| (name.clone(), v)),
            )
            .map(|(name, v)| (name, (v.lnl, v.nfp, v.tree_length)))
            .collect()
    }

    fn to_rich_dict(&self, py: Python<'_>) -> PyResult<PyObject> {
        let text = self.inner.to_rich_dict().to_string();
        Ok(py.import("json")?.call_method1("loads", (text,))?.unbind())
    }

    #[staticmethod]
    fn from_rich_dict(data: &Bound<'_, PyAny>) -> PyResult<Self> {
        let text: String = data
            .py()
            .import("json")?
            .call_method1("dumps", (data,))?
            .extract()?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| PyValueError::new_err(format!("invalid rich dict: {e}")))?;
        phylo::ModelFinderResult::from_rich_dict(&value)
            .map(|inner| Self { inner })
            .into_pyresult()
    }

    fn __repr__(&self) -> String {
        format!(
            "ModelFinderResult(source='{}', best_aic={}, best_aicc={}, best_bic={})",
            self.inner.source(),
            self.inner.best_aic(),
            self.inner.best_aicc(),
            self.inner.best_bic()
        )
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Alignment from a `{name: sequence}` dict, keeping insertion order.
fn alignment(seqs: &Bound<'_, PyDict>, source: Option<String>) -> PyResult<Alignment> {
    let pairs = seqs
        .iter()
        .map(|(k, v)| Ok((k.extract::<String>()?, v.extract::<String>()?)))
        .collect::<PyResult<Vec<_>>>()?;
    let aln = Alignment::new(pairs).into_pyresult()?;
    Ok(match source {
        Some(source) => aln.with_source(source),
        None => aln,
    })
}

/// Reconstruct a maximum-likelihood tree.
#[pyfunction]
#[pyo3(signature = (seqs, model, rand_seed=None, bootstrap_replicates=0, num_threads=None))]
fn build_tree(
    py: Python<'_>,
    seqs: &Bound<'_, PyDict>,
    model: ModelArg,
    rand_seed: Option<i32>,
    bootstrap_replicates: u32,
    num_threads: Option<u32>,
) -> PyResult<Tree> {
    let aln = alignment(seqs, None)?;
    let model = model.resolve()?;
    let options = BuildTreeOptions {
        rand_seed,
        bootstrap_replicates,
        num_threads,
    };
    py.allow_threads(|| phylo::build_tree(&NativeLibrary, &aln, &model, &options))
        .map(Tree::from)
        .into_pyresult()
}

/// Fit branch lengths and model parameters to a fixed topology.
#[pyfunction]
#[pyo3(signature = (seqs, tree, model, rand_seed=None, num_threads=None))]
fn fit_tree(
    py: Python<'_>,
    seqs: &Bound<'_, PyDict>,
    tree: PyRef<'_, Tree>,
    model: ModelArg,
    rand_seed: Option<i32>,
    num_threads: Option<u32>,
) -> PyResult<Tree> {
    let aln = alignment(seqs, None)?;
    let model = model.resolve()?;
    let options = FitTreeOptions {
        rand_seed,
        num_threads,
    };
    let topology = &tree.inner;
    py.allow_threads(|| phylo::fit_tree(&NativeLibrary, &aln, topology, &model, &options))
        .map(Tree::from)
        .into_pyresult()
}

/// Generate random trees with taxa named `0..num_taxa`.
#[pyfunction]
#[pyo3(signature = (num_trees, num_taxa, tree_mode="YULE_HARDING", rand_seed=None))]
fn random_trees(
    py: Python<'_>,
    num_trees: u32,
    num_taxa: u32,
    tree_mode: &str,
    rand_seed: Option<i32>,
) -> PyResult<Vec<Tree>> {
    let mode: TreeGenMode = tree_mode.parse().into_pyresult()?;
    let trees = py
        .allow_threads(|| phylo::random_trees(&NativeLibrary, num_trees, num_taxa, mode, rand_seed))
        .into_pyresult()?;
    Ok(trees.into_iter().map(Tree::from).collect())
}

/// Pairwise Robinson-Foulds distances as a nested list.
#[pyfunction]
fn robinson_foulds(py: Python<'_>, trees: Vec<PyRef<'_, Tree>>) -> PyResult<Vec<Vec<i32>>> {
    let trees: Vec<phylo::PhyloTree> = trees.iter().map(|t| t.inner.clone()).collect();
    py.allow_threads(|| phylo::robinson_foulds(&NativeLibrary, &trees))
        .into_pyresult()
}

/// Pairwise JC69 distances: `(names, square matrix)`.
#[pyfunction]
#[pyo3(signature = (seqs, num_threads=None))]
fn jc_distances(
    py: Python<'_>,
    seqs: &Bound<'_, PyDict>,
    num_threads: Option<u32>,
) -> PyResult<(Vec<String>, Vec<Vec<f64>>)> {
    let aln = alignment(seqs, None)?;
    let dm = py
        .allow_threads(|| phylo::jc_distances(&NativeLibrary, &aln, num_threads))
        .into_pyresult()?;
    let n = dm.n();
    let rows = (0..n).map(|i| (0..n).map(|j| dm.get(i, j)).collect()).collect();
    Ok((dm.names().to_vec(), rows))
}

/// Neighbour-joining tree from a labelled square distance matrix.
#[pyfunction]
fn nj_tree(py: Python<'_>, names: Vec<String>, matrix: Vec<Vec<f64>>) -> PyResult<Tree> {
    let n = names.len();
    if matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
        return Err(PyValueError::new_err(format!(
            "distance matrix must be {n} x {n} to match the names"
        )));
    }
    let flat: Vec<f64> = matrix.into_iter().flatten().collect();
    let dm = DistanceMatrix::from_square(names, &flat).into_pyresult()?;
    py.allow_threads(|| phylo::nj_tree(&NativeLibrary, &dm))
        .map(Tree::from)
        .into_pyresult()
}

/// Run ModelFinder. Empty sets use IQ-TREE's defaults.
#[pyfunction]
#[pyo3(signature = (
    seqs,
    model_set=Vec::new(),
    freq_set=Vec::new(),
    rate_set=Vec::new(),
    rand_seed=None,
    num_threads=None,
    source=None
))]
#[allow(clippy::too_many_arguments)]
fn model_finder(
    py: Python<'_>,
    seqs: &Bound<'_, PyDict>,
    model_set: Vec<String>,
    freq_set: Vec<String>,
    rate_set: Vec<String>,
    rand_seed: Option<i32>,
    num_threads: Option<u32>,
    source: Option<String>,
) -> PyResult<ModelFinderResult> {
    let aln = alignment(seqs, source)?;
    let options = ModelFinderOptions {
        model_set,
        freq_set,
        rate_set,
        rand_seed,
        num_threads,
    };
    py.allow_threads(|| phylo::model_finder(&NativeLibrary, &aln, &options))
        .map(|inner| ModelFinderResult { inner })
        .into_pyresult()
}

pub fn version() -> PyResult<String> {
    phylo::iqtree_version(&NativeLibrary).into_pyresult()
}

/// Version string of the linked IQ-TREE library.
#[pyfunction]
fn iqtree_version() -> PyResult<String> {
    version()
}

// ---------------------------------------------------------------------------
// Submodule registration
// ---------------------------------------------------------------------------

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new(parent.py(), "phylo")?;
    m.add_class::<Tree>()?;
    m.add_class::<ModelFinderResult>()?;
    m.add_function(wrap_pyfunction!(build_tree, &m)?)?;
    m.add_function(wrap_pyfunction!(fit_tree, &m)?)?;
    m.add_function(wrap_pyfunction!(random_trees, &m)?)?;
    m.add_function(wrap_pyfunction!(robinson_foulds, &m)?)?;
    m.add_function(wrap_pyfunction!(jc_distances, &m)?)?;
    m.add_function(wrap_pyfunction!(nj_tree, &m)?)?;
    m.add_function(wrap_pyfunction!(model_finder, &m)?)?;
    m.add_function(wrap_pyfunction!(iqtree_version, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}
