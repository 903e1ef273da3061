//! End-to-end checks against the linked IQ-TREE library.

#![cfg(feature = "native")]

use piqtree_phylo::{
    build_tree, jc_distances, make_model, nj_tree, random_trees, robinson_foulds, Alignment,
    BuildTreeOptions, NativeLibrary, PhyloTree, TreeGenMode,
};

fn primates() -> Alignment {
    Alignment::new([
        ("Human", "ACGTTGCAATGCCGTAGCTAGCTAGCTACGATCGATGCATGCAGCTAGCTAGCATCG"),
        ("Chimpanzee", "ACGTTGCAATGCCGTAGCTAGCTAGCTACGATCGATGCATGCAGCTAGCTAGCATCC"),
        ("Rhesus", "ACGTTGCGATGCCGTAGCTAGGTAGCTACGATCGTTGCATGCAGCTAGCTTGCATCG"),
        ("Mouse", "ACGATGCGATGACGTAGCAAGGTAGCTTCGATCGTTGCATGGAGCTTGCTTGCTTCG"),
    ])
    .unwrap()
}

fn expected() -> PhyloTree {
    PhyloTree::from_newick("(Human,Chimpanzee,(Rhesus,Mouse));").unwrap()
}

#[test]
fn build_tree_recovers_topology() {
    let engine = NativeLibrary::new();
    let model = make_model("JC").unwrap();
    for rand_seed in [Some(1), None] {
        let options = BuildTreeOptions {
            rand_seed,
            ..Default::default()
        };
        let tree = build_tree(&engine, &primates(), &model, &options).unwrap();
        assert_eq!(tree.leaf_count(), 4);
        assert!(tree.lnl().is_some());
        let rf = robinson_foulds(&engine, &[tree, expected()]).unwrap();
        assert_eq!(rf[0][1], 0);
    }
}

#[test]
fn nj_on_jc_distances() {
    let engine = NativeLibrary::new();
    let dm = jc_distances(&engine, &primates(), None).unwrap();
    let tree = nj_tree(&engine, &dm).unwrap();
    assert_eq!(tree.leaf_names(), ["Chimpanzee", "Human", "Mouse", "Rhesus"]);
}

#[test]
fn random_trees_with_too_few_taxa_fail() {
    let engine = NativeLibrary::new();
    assert!(random_trees(&engine, 2, 3, TreeGenMode::Balanced, Some(1)).is_err());
}
