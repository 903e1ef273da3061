//! Python bindings for the model grammar and option tables.

use piqtree_phylo::{self as phylo, ModelType};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::IntoPyResult;

/// A substitution model with optional frequency and rate components.
#[pyclass(frozen, eq, hash, module = "piqtree.model")]
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Model {
    pub(crate) inner: phylo::Model,
}

#[pymethods]
impl Model {
    #[new]
    #[pyo3(signature = (submod_type, freq_type=None, invariant_sites=false, rate_model=None))]
    fn new(
        submod_type: &str,
        freq_type: Option<&str>,
        invariant_sites: bool,
        rate_model: Option<&str>,
    ) -> PyResult<Self> {
        let mut inner = phylo::Model::new(submod_type)
            .into_pyresult()?
            .with_invariant_sites(invariant_sites);
        if let Some(freq_type) = freq_type {
            inner = inner.with_freq_type(freq_type).into_pyresult()?;
        }
        if let Some(rate_model) = rate_model {
            inner = inner.with_rate_model(rate_model).into_pyresult()?;
        }
        Ok(Self { inner })
    }

    #[getter]
    fn substitution_model(&self) -> &'static str {
        self.inner.substitution().iqtree_str()
    }

    /// `"nucleotide"` or `"protein"`.
    #[getter]
    fn model_type(&self) -> &'static str {
        self.inner.substitution().model_type().as_str()
    }

    #[getter]
    fn freq_type(&self) -> Option<&'static str> {
        self.inner.freq_type().map(|f| f.iqtree_str())
    }

    #[getter]
    fn invariant_sites(&self) -> bool {
        self.inner.invariant_sites()
    }

    #[getter]
    fn rate_model(&self) -> Option<String> {
        self.inner.rate_model().map(|r| r.iqtree_str())
    }

    /// Combined invariant-sites and rate component, e.g. `"+I+G4"`.
    #[getter]
    fn rate_type(&self) -> String {
        self.inner.rate_type().iqtree_str()
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }

    fn __repr__(&self) -> String {
        format!("Model('{}')", self.inner)
    }
}

impl From<phylo::Model> for Model {
    fn from(inner: phylo::Model) -> Self {
        Self { inner }
    }
}

/// Either a `Model` or an IQ-TREE model string.
#[derive(FromPyObject)]
pub enum ModelArg {
    Model(Model),
    Str(String),
}

impl ModelArg {
    pub fn resolve(self) -> PyResult<phylo::Model> {
        match self {
            Self::Model(m) => Ok(m.inner),
            Self::Str(s) => phylo::make_model(&s).into_pyresult(),
        }
    }
}

/// Parse an IQ-TREE model string such as `"GTR+FO+I+R3"`.
#[pyfunction]
fn make_model(iqtree_str: &str) -> PyResult<Model> {
    phylo::make_model(iqtree_str).map(Model::from).into_pyresult()
}

fn parse_model_type(model_type: &str) -> PyResult<ModelType> {
    match model_type.to_ascii_lowercase().as_str() {
        "dna" | "nucleotide" => Ok(ModelType::Nucleotide),
        "protein" => Ok(ModelType::Protein),
        other => Err(PyValueError::new_err(format!(
            "unknown model type: {other} (expected 'dna' or 'protein')"
        ))),
    }
}

/// Table of the available substitution models, optionally of one type.
#[pyfunction]
#[pyo3(signature = (model_type=None))]
fn available_models(model_type: Option<&str>) -> PyResult<String> {
    let model_type = model_type.map(parse_model_type).transpose()?;
    Ok(phylo::available_models(model_type).to_string())
}

/// Table of the state frequency types.
#[pyfunction]
fn available_freq_type() -> String {
    phylo::available_freq_type().to_string()
}

/// Table of the rate heterogeneity types.
#[pyfunction]
fn available_rate_type() -> String {
    phylo::available_rate_type().to_string()
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new(parent.py(), "model")?;
    m.add_class::<Model>()?;
    m.add_function(wrap_pyfunction!(make_model, &m)?)?;
    m.add_function(wrap_pyfunction!(available_models, &m)?)?;
    m.add_function(wrap_pyfunction!(available_freq_type, &m)?)?;
    m.add_function(wrap_pyfunction!(available_rate_type, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}
