//! Map `PiqtreeError` variants to Python exceptions.

use piqtree_core::PiqtreeError;
use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::PyErr;

/// Extension trait for converting `Result<T, PiqtreeError>` into `PyResult<T>`.
pub trait IntoPyResult<T> {
    fn into_pyresult(self) -> pyo3::PyResult<T>;
}

impl<T> IntoPyResult<T> for Result<T, PiqtreeError> {
    fn into_pyresult(self) -> pyo3::PyResult<T> {
        self.map_err(to_pyerr)
    }
}

fn to_pyerr(e: PiqtreeError) -> PyErr {
    match e {
        PiqtreeError::Io(_) => PyIOError::new_err(e.to_string()),
        PiqtreeError::NativeEngineFailure(_) | PiqtreeError::MalformedNativeOutput(_) => {
            PyRuntimeError::new_err(e.to_string())
        }
        _ => PyValueError::new_err(e.to_string()),
    }
}
