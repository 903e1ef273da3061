//! Python bindings for piqtree.
//!
//! Submodules:
//!
//! - `piqtree.model`: substitution models, `make_model` and option tables
//! - `piqtree.phylo`: tree building, fitting, ModelFinder and distances

mod error;
mod model;
mod phylo;

use pyo3::prelude::*;

#[pymodule]
fn piqtree(m: &Bound<'_, PyModule>) -> PyResult<()> {
    model::register(m)?;
    phylo::register(m)?;

    // Register submodules in sys.modules so `from piqtree.model import Model` works.
    let sys = m.py().import("sys")?;
    let modules = sys.getattr("modules")?;
    for name in ["model", "phylo"] {
        modules.set_item(format!("piqtree.{name}"), m.getattr(name)?)?;
    }

    m.add("__iqtree_version__", phylo::version()?)?;
    Ok(())
}
