//! Configured, serialisable pipeline units.
//!
//! Each app holds the fixed parameters of one operation and applies it to a
//! single input. Apps are plain serde structs, so a configured app can be
//! written out as JSON and rebuilt in a worker process.

use piqtree_core::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::alignment::Alignment;
use crate::distance::DistanceMatrix;
use crate::iqtree::{
    self, BuildTreeOptions, FitTreeOptions, ModelFinderOptions, TreeGenMode,
};
use crate::model::Model;
use crate::model_finder::ModelFinderResult;
use crate::native::IqTreeEngine;
use crate::tree::PhyloTree;

/// A pipeline unit with fixed parameters.
pub trait App {
    type Input;
    type Output;

    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn apply<E>(&self, engine: &E, input: Self::Input) -> Result<Self::Output>
    where
        E: IqTreeEngine + ?Sized;

    /// Apply to every input, keeping each outcome. Failures do not stop the
    /// batch; what to do with them is up to the caller.
    fn apply_all<E, I>(&self, engine: &E, inputs: I) -> Vec<Result<Self::Output>>
    where
        E: IqTreeEngine + ?Sized,
        I: IntoIterator<Item = Self::Input>,
    {
        inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| {
                let outcome = self.apply(engine, input);
                if let Err(e) = &outcome {
                    warn!(app = self.name(), index, error = %e, "app failed");
                }
                outcome
            })
            .collect()
    }
}

/// Maximum-likelihood tree reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhyloApp {
    pub model: Model,
    #[serde(flatten)]
    pub options: BuildTreeOptions,
}

impl PhyloApp {
    pub fn new(model: Model) -> Self {
        Self {
            model,
            options: BuildTreeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildTreeOptions) -> Self {
        self.options = options;
        self
    }
}

impl App for PhyloApp {
    type Input = Alignment;
    type Output = PhyloTree;

    fn name(&self) -> &'static str {
        "piqtree_phylo"
    }

    fn apply<E>(&self, engine: &E, aln: Alignment) -> Result<PhyloTree>
    where
        E: IqTreeEngine + ?Sized,
    {
        iqtree::build_tree(engine, &aln, &self.model, &self.options)
    }
}

/// Branch length and parameter fitting on a fixed topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitApp {
    pub tree: PhyloTree,
    pub model: Model,
    #[serde(flatten)]
    pub options: FitTreeOptions,
}

impl FitApp {
    pub fn new(tree: PhyloTree, model: Model) -> Self {
        Self {
            tree,
            model,
            options: FitTreeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FitTreeOptions) -> Self {
        self.options = options;
        self
    }
}

impl App for FitApp {
    type Input = Alignment;
    type Output = PhyloTree;

    fn name(&self) -> &'static str {
        "piqtree_fit"
    }

    fn apply<E>(&self, engine: &E, aln: Alignment) -> Result<PhyloTree>
    where
        E: IqTreeEngine + ?Sized,
    {
        iqtree::fit_tree(engine, &aln, &self.tree, &self.model, &self.options)
    }
}

/// Random tree generation; the input is the number of trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomTreesApp {
    pub num_taxa: u32,
    pub mode: TreeGenMode,
    #[serde(default)]
    pub rand_seed: Option<i32>,
}

impl RandomTreesApp {
    pub fn new(num_taxa: u32, mode: TreeGenMode) -> Self {
        Self {
            num_taxa,
            mode,
            rand_seed: None,
        }
    }
}

impl App for RandomTreesApp {
    type Input = u32;
    type Output = Vec<PhyloTree>;

    fn name(&self) -> &'static str {
        "piqtree_random_trees"
    }

    fn apply<E>(&self, engine: &E, num_trees: u32) -> Result<Vec<PhyloTree>>
    where
        E: IqTreeEngine + ?Sized,
    {
        iqtree::random_trees(engine, num_trees, self.num_taxa, self.mode, self.rand_seed)
    }
}

/// Pairwise Jukes-Cantor distances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JcDistancesApp {
    #[serde(default)]
    pub num_threads: Option<u32>,
}

impl App for JcDistancesApp {
    type Input = Alignment;
    type Output = DistanceMatrix;

    fn name(&self) -> &'static str {
        "piqtree_jc_dists"
    }

    fn apply<E>(&self, engine: &E, aln: Alignment) -> Result<DistanceMatrix>
    where
        E: IqTreeEngine + ?Sized,
    {
        iqtree::jc_distances(engine, &aln, self.num_threads)
    }
}

/// Neighbour-joining from a distance matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NjApp {}

impl App for NjApp {
    type Input = DistanceMatrix;
    type Output = PhyloTree;

    fn name(&self) -> &'static str {
        "piqtree_nj"
    }

    fn apply<E>(&self, engine: &E, distances: DistanceMatrix) -> Result<PhyloTree>
    where
        E: IqTreeEngine + ?Sized,
    {
        iqtree::nj_tree(engine, &distances)
    }
}

/// ModelFinder over a fixed search space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFinderApp {
    #[serde(flatten)]
    pub options: ModelFinderOptions,
}

impl App for ModelFinderApp {
    type Input = Alignment;
    type Output = ModelFinderResult;

    fn name(&self) -> &'static str {
        "piqtree_mfinder"
    }

    fn apply<E>(&self, engine: &E, aln: Alignment) -> Result<ModelFinderResult>
    where
        E: IqTreeEngine + ?Sized,
    {
        iqtree::model_finder(engine, &aln, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::make_model;

    #[test]
    fn phylo_app_config_round_trip() {
        let app = PhyloApp::new(make_model("GTR+F+G4").unwrap()).with_options(BuildTreeOptions {
            rand_seed: Some(1),
            ..Default::default()
        });
        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["model"], "GTR+F+G4");
        assert_eq!(json["rand_seed"], 1);
        let back: PhyloApp = serde_json::from_value(json).unwrap();
        assert_eq!(back, app);
    }

    #[test]
    fn minimal_configs_take_defaults() {
        let app: PhyloApp = serde_json::from_str(r#"{"model": "JC"}"#).unwrap();
        assert_eq!(app.options, BuildTreeOptions::default());

        let app: RandomTreesApp =
            serde_json::from_str(r#"{"num_taxa": 5, "mode": "BALANCED"}"#).unwrap();
        assert_eq!(app, RandomTreesApp::new(5, TreeGenMode::Balanced));

        let app: ModelFinderApp = serde_json::from_str(r#"{"model_set": ["HKY"]}"#).unwrap();
        assert_eq!(app.options.model_set, ["HKY"]);
    }

    #[test]
    fn fit_app_carries_its_tree() {
        let tree = PhyloTree::from_newick("(a,b,(c,d));").unwrap();
        let app = FitApp::new(tree, make_model("HKY").unwrap());
        let json = serde_json::to_string(&app).unwrap();
        let back: FitApp = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tree.to_newick(), "(a,b,(c,d));");
        assert_eq!(back.model, app.model);
    }

    #[test]
    fn invalid_model_in_config_rejected() {
        assert!(serde_json::from_str::<PhyloApp>(r#"{"model": "GYR"}"#).is_err());
    }
}
