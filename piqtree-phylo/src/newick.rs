//! Newick reading and writing.
//!
//! IQ-TREE writes plain Newick with numeric tip labels and lengths that may
//! use exponent notation. Labels containing Newick punctuation or whitespace
//! are single-quoted, with `''` standing for a literal quote.

use std::fmt::Write;

use piqtree_core::{PiqtreeError, Result};

use crate::tree::{Node, NodeId, PhyloTree};

/// Read one `;`-terminated tree.
pub fn parse(input: &str) -> Result<PhyloTree> {
    let mut reader = Reader::new(input);
    let root = reader.subtree(None)?;
    reader.skip_blank();
    if !reader.eat(';') {
        return Err(reader.error("expected ';' after the tree"));
    }
    PhyloTree::from_nodes(reader.nodes, root)
}

/// Read every tree in `input`. Trees end at a top-level `;`, a line break or
/// the end of input; blank entries are skipped.
pub fn parse_many(input: &str) -> Result<Vec<PhyloTree>> {
    let mut reader = Reader::new(input);
    let mut trees = Vec::new();
    loop {
        reader.take_while(|c| c.is_whitespace() || c == ';');
        if reader.peek().is_none() {
            return Ok(trees);
        }
        let root = reader.subtree(None)?;
        // Back up over blanks the subtree consumed so a line break still ends it.
        reader.at = reader.text[..reader.at].trim_end().len();
        reader.take_while(|c| c.is_whitespace() && c != '\n');
        if !(reader.eat(';') || reader.eat('\n') || reader.peek().is_none()) {
            return Err(reader.error("expected ';' or a line break after the tree"));
        }
        trees.push(PhyloTree::from_nodes(std::mem::take(&mut reader.nodes), root)?);
    }
}

/// Render `tree` as a `;`-terminated Newick string.
///
/// Branch lengths use the shortest decimal form that reads back to the same
/// `f64`.
pub fn write(tree: &PhyloTree) -> String {
    let mut out = String::new();
    write_node(tree, tree.root(), &mut out);
    out.push(';');
    out
}

fn write_node(tree: &PhyloTree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get_node(id) else {
        return;
    };
    if let Some((first, rest)) = node.children.split_first() {
        out.push('(');
        write_node(tree, *first, out);
        for &child in rest {
            out.push(',');
            write_node(tree, child, out);
        }
        out.push(')');
    }
    if let Some(name) = &node.name {
        push_label(name, out);
    }
    if let Some(length) = node.branch_length {
        let _ = write!(out, ":{length}");
    }
}

fn needs_quoting(label: &str) -> bool {
    label
        .chars()
        .any(|c| c.is_whitespace() || "():;,'[]".contains(c))
}

fn push_label(label: &str, out: &mut String) {
    if needs_quoting(label) {
        out.push('\'');
        out.push_str(&label.replace('\'', "''"));
        out.push('\'');
    } else {
        out.push_str(label);
    }
}

/// Recursive-descent reader over the input text.
struct Reader<'a> {
    text: &'a str,
    at: usize,
    nodes: Vec<Node>,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            at: 0,
            nodes: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.at..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.at += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_blank(&mut self) {
        let trimmed = self.rest().trim_start();
        self.at = self.text.len() - trimmed.len();
    }

    /// Advance over the longest prefix whose chars satisfy `keep`.
    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !keep(c)).unwrap_or(rest.len());
        self.at += len;
        &rest[..len]
    }

    fn error(&self, what: &str) -> PiqtreeError {
        PiqtreeError::Parse(format!("Newick, {what} at byte {}", self.at))
    }

    /// `( subtree , ... ) label` or a bare `label`.
    fn subtree(&mut self, parent: Option<NodeId>) -> Result<NodeId> {
        let id = self.nodes.len();
        self.nodes.push(Node::detached(id, parent));

        self.skip_blank();
        if self.eat('(') {
            loop {
                let child = self.subtree(Some(id))?;
                self.nodes[id].children.push(child);
                self.skip_blank();
                if !self.eat(',') {
                    break;
                }
            }
            if !self.eat(')') {
                return Err(self.error("expected ')'"));
            }
        }

        self.skip_blank();
        let name = if self.peek() == Some('\'') {
            self.quoted()?
        } else {
            self.take_while(|c| !c.is_whitespace() && !"():;,".contains(c))
                .to_string()
        };
        if !name.is_empty() {
            self.nodes[id].name = Some(name);
        }

        self.skip_blank();
        if self.eat(':') {
            self.skip_blank();
            let length = self.take_while(|c| c.is_ascii_digit() || "+-.eE".contains(c));
            if length.is_empty() {
                return Err(self.error("expected a branch length after ':'"));
            }
            let length = length
                .parse::<f64>()
                .map_err(|_| PiqtreeError::Parse(format!("invalid branch length '{length}'")))?;
            self.nodes[id].branch_length = Some(length);
        }
        Ok(id)
    }

    /// A single-quoted label; the cursor is on the opening quote.
    fn quoted(&mut self) -> Result<String> {
        self.at += 1;
        let mut label = String::new();
        loop {
            let chunk = self.take_while(|c| c != '\'');
            label.push_str(chunk);
            if !self.eat('\'') {
                return Err(self.error("unterminated quoted label"));
            }
            if !self.eat('\'') {
                return Ok(label);
            }
            label.push('\'');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_iqtree_output() {
        let tree = parse(
            "(0:0.0063211201,1:0.0029675780,(2:0.0228519739,3:0.3072009029):0.01373649616);",
        )
        .unwrap();
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.leaf_names(), vec!["0", "1", "2", "3"]);
    }

    #[test]
    fn parse_exponent_lengths() {
        let tree = parse("((0:0.005,1:0.002):2.340509431e-06,2:0.02):0;").unwrap();
        let root = tree.get_node(tree.root()).unwrap();
        assert_eq!(root.branch_length, Some(0.0));
        let inner = tree.get_node(root.children[0]).unwrap();
        assert_eq!(inner.branch_length, Some(2.340509431e-06));
    }

    #[test]
    fn small_lengths_survive_writing() {
        let text = "((0:0.005,1:0.002):2.340509431e-06,2:0.02):0;";
        let again = parse(&write(&parse(text).unwrap())).unwrap();
        let root = again.get_node(again.root()).unwrap();
        let inner = again.get_node(root.children[0]).unwrap();
        assert_eq!(inner.branch_length, Some(2.340509431e-06));
    }

    #[test]
    fn internal_labels_kept() {
        let tree = parse("((A,B)AB,(C,D)CD)root;").unwrap();
        let root = tree.get_node(tree.root()).unwrap();
        assert_eq!(root.name.as_deref(), Some("root"));
        assert_eq!(tree.leaf_names(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn quoted_labels() {
        let tree = parse("('Homo sapiens':0.1,'it''s':0.2);").unwrap();
        assert_eq!(tree.leaf_names(), vec!["Homo sapiens", "it's"]);
        assert_eq!(write(&tree), "('Homo sapiens':0.1,'it''s':0.2);");
    }

    #[test]
    fn malformed_input_rejected() {
        for bad in ["((A,B);", "(A,B)", "(A:abc,B);", "(A:,B);", "('A,B);"] {
            assert!(
                matches!(parse(bad), Err(PiqtreeError::Parse(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn parse_many_splits_lines_and_semicolons() {
        let trees = parse_many("(0,1,2);\n(0,(1,2));(2,(0,1));\n\n").unwrap();
        assert_eq!(trees.len(), 3);
        assert!(trees.iter().all(|t| t.leaf_count() == 3));
    }

    #[test]
    fn parse_many_keeps_quoted_semicolons() {
        let one = parse("('a;b':1,c:2,d:3);").unwrap();
        let text = format!("{}\n{}", write(&one), "(c,d,'x;y');");
        let trees = parse_many(&text).unwrap();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].leaf_names(), vec!["a;b", "c", "d"]);
        assert_eq!(trees[1].leaf_names(), vec!["c", "d", "x;y"]);
    }

    #[test]
    fn parse_many_without_terminators() {
        let trees = parse_many("(0,1,2)\r\n(0,(1,2))").unwrap();
        assert_eq!(trees.len(), 2);
        assert!(matches!(
            parse_many("(0,1,2) (0,1);"),
            Err(PiqtreeError::Parse(_))
        ));
    }

    #[test]
    fn topology_only_round_trip() {
        let input = "(Human,Chimpanzee,(Rhesus,Mouse));";
        assert_eq!(write(&parse(input).unwrap()), input);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn labels() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::btree_set("[A-Za-z][A-Za-z0-9 ']{0,5}", 2..=6)
            .prop_map(|s| s.into_iter().collect())
    }

    proptest! {
        #[test]
        fn written_labels_read_back(leaves in labels(), length in 1e-9f64..10.0) {
            // Ladder: each internal node carries one leaf and the next rung.
            let mut tree = PhyloTree::new();
            let mut rung = tree.root();
            let (last, ladder) = leaves.split_last().unwrap();
            for leaf in ladder {
                tree.add_child(rung, Some(leaf.clone()), Some(length)).unwrap();
                rung = tree.add_child(rung, None, Some(length)).unwrap();
            }
            tree.add_child(rung, Some(last.clone()), Some(length)).unwrap();

            let again = parse(&write(&tree)).unwrap();
            prop_assert_eq!(tree.leaf_names(), again.leaf_names());
            let tip = again.leaves()[0];
            prop_assert_eq!(again.get_node(tip).unwrap().branch_length, Some(length));
        }

        #[test]
        fn arbitrary_text_does_not_panic(s in "\\PC{0,100}") {
            let _ = parse(&s);
        }
    }
}
