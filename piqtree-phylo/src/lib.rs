//! Phylogenetic inference through the IQ-TREE library.
//!
//! `piqtree-phylo` wraps IQ-TREE's tree search, model fitting, ModelFinder,
//! neighbour-joining and distance routines behind typed Rust APIs:
//!
//! - **Models**: [`Model`] and [`make_model`] for strings such as `GTR+FO+I+R6`
//! - **Trees**: arena [`PhyloTree`] with Newick I/O, carrying fitted
//!   log-likelihood and per-edge parameters
//! - **Operations**: [`build_tree`], [`fit_tree`], [`random_trees`],
//!   [`robinson_foulds`], [`jc_distances`], [`nj_tree`], [`model_finder`]
//! - **Apps**: serialisable, pre-configured units for pipelines ([`app`])
//! - **Option tables**: [`available_models`], [`available_freq_type`],
//!   [`available_rate_type`]
//!
//! Operations take any [`IqTreeEngine`]. Enable the `native` feature for
//! [`NativeLibrary`], which links `libiqtree2`.
//!
//! # Example
//!
//! ```
//! use piqtree_phylo::{make_model, DnaModel, FreqType, SubstitutionModel};
//!
//! let model = make_model("HKY+G8+FQ").unwrap();
//! assert_eq!(model.substitution(), SubstitutionModel::Dna(DnaModel::HKY));
//! assert_eq!(model.freq_type(), Some(FreqType::FQ));
//! assert_eq!(model.to_string(), "HKY+FQ+G8");
//! ```

pub mod alignment;
pub mod app;
pub mod distance;
pub mod iqtree;
pub mod model;
pub mod model_finder;
pub mod native;
pub mod newick;
pub mod options;
pub mod params;
pub mod reconcile;
pub mod tree;

pub use alignment::Alignment;
pub use app::{App, FitApp, JcDistancesApp, ModelFinderApp, NjApp, PhyloApp, RandomTreesApp};
pub use distance::DistanceMatrix;
pub use iqtree::{
    build_tree, fit_tree, iqtree_version, jc_distances, model_finder, nj_tree, random_trees,
    robinson_foulds, BuildTreeOptions, FitTreeOptions, ModelFinderOptions, TreeGenMode,
};
pub use model::{
    make_model, AaModel, DnaModel, FreqType, Model, ModelType, RateModel, RateType,
    SubstitutionModel,
};
pub use model_finder::{Criterion, ModelFinderResult, ModelResultValue};
pub use native::IqTreeEngine;
#[cfg(feature = "native")]
pub use native::NativeLibrary;
pub use options::{available_freq_type, available_models, available_rate_type, OptionTable};
pub use params::{EdgeParams, TreeParams};
pub use reconcile::process_tree_yaml;
pub use tree::{Node, NodeId, PhyloTree};
