//! Named, aligned sequences as handed to IQ-TREE.

use std::collections::HashSet;

use piqtree_core::{PiqtreeError, Result, Summarizable};
use serde::{Deserialize, Serialize};

/// An ordered collection of aligned sequences.
///
/// All sequences have the same length and every name is unique. Order is
/// preserved; IQ-TREE reports taxa by their index into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    names: Vec<String>,
    seqs: Vec<String>,
    source: Option<String>,
}

impl Alignment {
    /// Build from `(name, sequence)` pairs.
    ///
    /// ```
    /// use piqtree_phylo::Alignment;
    ///
    /// let aln = Alignment::new([("a", "ACGT"), ("b", "ACGA")]).unwrap();
    /// assert_eq!(aln.n_sequences(), 2);
    /// assert_eq!(aln.n_columns(), 4);
    /// ```
    pub fn new<I, N, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let (names, seqs): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(n, s)| (n.into(), s.into()))
            .unzip();

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if name.is_empty() {
                return Err(PiqtreeError::InvalidInput("empty sequence name".into()));
            }
            if !seen.insert(name.as_str()) {
                return Err(PiqtreeError::InvalidInput(format!(
                    "duplicate sequence name '{}'",
                    name
                )));
            }
        }
        if let Some(first) = seqs.first() {
            let len = first.len();
            for (name, seq) in names.iter().zip(&seqs) {
                if seq.len() != len {
                    return Err(PiqtreeError::InvalidInput(format!(
                        "sequence '{}' has length {}, expected {}",
                        name,
                        seq.len(),
                        len
                    )));
                }
            }
        }

        Ok(Self {
            names,
            seqs,
            source: None,
        })
    }

    /// Parse aligned FASTA. Sequence lines are concatenated; the name is the
    /// header up to the first whitespace.
    pub fn from_fasta(input: &str) -> Result<Self> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for line in input.lines().map(str::trim_end) {
            if let Some(header) = line.strip_prefix('>') {
                let name = header.split_whitespace().next().unwrap_or("");
                pairs.push((name.to_string(), String::new()));
            } else if !line.is_empty() {
                let (_, seq) = pairs.last_mut().ok_or_else(|| {
                    PiqtreeError::Parse("FASTA sequence data before first header".into())
                })?;
                seq.push_str(line.trim());
            }
        }
        Self::new(pairs)
    }

    /// Record where the alignment came from (e.g. a file path).
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn seqs(&self) -> &[String] {
        &self.seqs
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn n_sequences(&self) -> usize {
        self.names.len()
    }

    pub fn n_columns(&self) -> usize {
        self.seqs.first().map_or(0, String::len)
    }

    /// Sequence for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.seqs[i].as_str())
    }
}

impl Summarizable for Alignment {
    fn summary(&self) -> String {
        format!(
            "Alignment: {} sequences x {} columns",
            self.n_sequences(),
            self.n_columns()
        )
    }
}
