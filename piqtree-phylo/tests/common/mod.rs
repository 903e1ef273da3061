//! Canned-output engine for driving the operations without libiqtree2.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use piqtree_core::{PiqtreeError, Result};
use piqtree_phylo::{Alignment, IqTreeEngine};

pub const TREE_YAML: &str = r#"
CandidateSet:
  0: "-6736.94578464 (0:0.0063211201,1:0.0029675780,(2:0.0228519739,3:0.3072009029):0.01373649616);"
  1: "-6757.78815651 (0:0.0063607954,(1:0.0030079874,2:0.0365597715):2.296825575e-06,3:0.3208135518);"
ModelDNA:
  rates: "1, 3.82025079, 1, 1, 3.82025079, 1"
  state_freq: "0.3628523161, 0.1852938562, 0.2173913044, 0.2344625233"
PhyloTree:
  newick: "(0:0.0063211201,1:0.0029675780,(2:0.0228519739,3:0.3072009029):0.01373649616);"
RateGammaInvar:
  gamma_shape: 1.698497993
  p_invar: 1.002841144e-06
iqtree:
  seed: 95633264
  version: "2.3.6.lib"
"#;

pub const MODEL_FINDER_YAML: &str = r#"
"HKY+G4": "-100.5 9 1.5"
"GTR+F+I": "-98.25 14 1.6"
best_model_AIC: "GTR+F+I"
best_model_AICc: "GTR+F+I"
best_model_BIC: "HKY+G4"
best_tree_AIC: "(0,1,(2,3));"
initTree: "(0,1,(2,3));"
partition_type: 0
"#;

pub fn four_taxa() -> Alignment {
    Alignment::new([
        ("Human", "ACGTACGTAC"),
        ("Chimpanzee", "ACGTACGTAA"),
        ("Rhesus", "ACGAACGTTC"),
        ("Mouse", "TCGAACCTTG"),
    ])
    .unwrap()
}

/// Engine returning fixed outputs and recording what it was asked.
pub struct MockEngine {
    pub tree_yaml: String,
    pub random_output: String,
    pub distances: Vec<f64>,
    pub nj_newick: String,
    pub model_finder_yaml: String,
    pub fail_with: Option<String>,
    pub calls: Mutex<Vec<String>>,
    pub cwd_during_call: Mutex<Option<PathBuf>>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self {
            tree_yaml: TREE_YAML.to_string(),
            random_output: "(0,1,(2,3));\n(0,(1,2),3);\n((0,1),2,3);\n".to_string(),
            distances: vec![
                0.0, 0.1, 0.3, 0.5, //
                0.1, 0.0, 0.3, 0.5, //
                0.3, 0.3, 0.0, 0.4, //
                0.5, 0.5, 0.4, 0.0,
            ],
            nj_newick: "(Human:0.05,Chimpanzee:0.05,(Rhesus:0.15,Mouse:0.25):0.1);".to_string(),
            model_finder_yaml: MODEL_FINDER_YAML.to_string(),
            fail_with: None,
            calls: Mutex::new(Vec::new()),
            cwd_during_call: Mutex::new(None),
        }
    }
}

impl MockEngine {
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        *self.cwd_during_call.lock().unwrap() = std::env::current_dir().ok();
        self.calls.lock().unwrap().push(call);
        match &self.fail_with {
            Some(msg) => Err(PiqtreeError::NativeEngineFailure(msg.clone())),
            None => Ok(()),
        }
    }
}

impl IqTreeEngine for MockEngine {
    fn build_tree(
        &self,
        names: &[String],
        _seqs: &[String],
        model: &str,
        rand_seed: i32,
        bootstrap_replicates: i32,
        num_threads: i32,
    ) -> Result<String> {
        self.record(format!(
            "build_tree n={} model={model} seed={rand_seed} bootstrap={bootstrap_replicates} threads={num_threads}",
            names.len()
        ))?;
        Ok(self.tree_yaml.clone())
    }

    fn fit_tree(
        &self,
        names: &[String],
        _seqs: &[String],
        model: &str,
        newick: &str,
        rand_seed: i32,
        num_threads: i32,
    ) -> Result<String> {
        self.record(format!(
            "fit_tree n={} model={model} newick={newick} seed={rand_seed} threads={num_threads}",
            names.len()
        ))?;
        Ok(self.tree_yaml.clone())
    }

    fn random_trees(
        &self,
        num_taxa: i32,
        tree_gen_mode: &str,
        num_trees: i32,
        rand_seed: i32,
    ) -> Result<String> {
        self.record(format!(
            "random_trees taxa={num_taxa} mode={tree_gen_mode} trees={num_trees} seed={rand_seed}"
        ))?;
        Ok(self.random_output.clone())
    }

    fn robinson_foulds(&self, tree1: &str, tree2: &str) -> Result<i32> {
        self.record(format!("robinson_foulds {tree1} {tree2}"))?;
        Ok(if tree1 == tree2 { 0 } else { 2 })
    }

    fn jc_distances(&self, names: &[String], _seqs: &[String], num_threads: i32) -> Result<Vec<f64>> {
        self.record(format!("jc_distances n={} threads={num_threads}", names.len()))?;
        Ok(self.distances.clone())
    }

    fn nj_tree(&self, names: &[String], distances: &[f64]) -> Result<String> {
        self.record(format!("nj_tree n={} d={}", names.len(), distances.len()))?;
        Ok(self.nj_newick.clone())
    }

    fn model_finder(
        &self,
        names: &[String],
        _seqs: &[String],
        rand_seed: i32,
        model_set: &str,
        freq_set: &str,
        rate_set: &str,
        num_threads: i32,
    ) -> Result<String> {
        self.record(format!(
            "model_finder n={} seed={rand_seed} mset={model_set} mfreq={freq_set} mrate={rate_set} threads={num_threads}",
            names.len()
        ))?;
        Ok(self.model_finder_yaml.clone())
    }

    fn version(&self) -> Result<String> {
        self.record("version".to_string())?;
        Ok("2.3.6.lib".to_string())
    }
}

/// Route `tracing` output through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
