//! User-facing tables of the available model components.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{FreqType, ModelType, RateType, SubstitutionModel};

/// A titled table of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionTable {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OptionTable {
    fn new(title: &str, header: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            title: title.to_string(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Values of column `index`, top to bottom.
    pub fn column(&self, index: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|r| r.get(index).map(String::as_str))
            .collect()
    }
}

impl fmt::Display for OptionTable {
    /// Plain text with left-aligned columns; the last column is not padded.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }
        let last = widths.len().saturating_sub(1);
        let write_row = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            for (i, cell) in cells.iter().enumerate() {
                if i > 0 {
                    f.write_str("  ")?;
                }
                if i == last {
                    f.write_str(cell)?;
                } else {
                    write!(f, "{:<width$}", cell, width = widths[i])?;
                }
            }
            writeln!(f)
        };

        writeln!(f, "{}", self.title)?;
        let rule = "-".repeat(widths.iter().sum::<usize>() + 2 * last);
        writeln!(f, "{rule}")?;
        write_row(f, &self.header)?;
        writeln!(f, "{rule}")?;
        for row in &self.rows {
            write_row(f, row)?;
        }
        write!(f, "{rule}")
    }
}

/// Substitution models with their type and description, optionally limited
/// to one model type.
pub fn available_models(model_type: Option<ModelType>) -> OptionTable {
    let rows = SubstitutionModel::all()
        .filter(|m| model_type.map_or(true, |t| m.model_type() == t))
        .map(|m| {
            vec![
                m.model_type().to_string(),
                m.iqtree_str().to_string(),
                m.description().to_string(),
            ]
        })
        .collect();
    OptionTable::new(
        "Available substitution models",
        &["Model Type", "Abbreviation", "Description"],
        rows,
    )
}

pub fn available_freq_type() -> OptionTable {
    let rows = FreqType::ALL
        .iter()
        .map(|f| vec![f.iqtree_str().to_string(), f.description().to_string()])
        .collect();
    OptionTable::new("Available frequency types", &["Freq Type", "Description"], rows)
}

pub fn available_rate_type() -> OptionTable {
    let rows = RateType::all_base()
        .iter()
        .map(|r| vec![r.iqtree_str(), r.description().to_string()])
        .collect();
    OptionTable::new(
        "Available rate heterogeneity types",
        &["Rate Type", "Description"],
        rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AaModel, DnaModel};

    #[test]
    fn model_counts_per_type() {
        let all = available_models(None);
        assert_eq!(all.n_rows(), DnaModel::ALL.len() + AaModel::ALL.len());

        let dna = available_models(Some(ModelType::Nucleotide));
        assert_eq!(dna.n_rows(), DnaModel::ALL.len());
        assert!(dna.column(0).iter().all(|t| *t == "nucleotide"));

        let aa = available_models(Some(ModelType::Protein));
        assert_eq!(aa.n_rows(), AaModel::ALL.len());
        assert!(aa.column(0).iter().all(|t| *t == "protein"));
    }

    #[test]
    fn every_model_is_described() {
        let table = available_models(None);
        assert!(table.column(2).iter().all(|d| !d.is_empty()));
        assert!(table.column(1).contains(&"NQ.plant"));
        assert!(table.column(1).contains(&"12.12"));
    }

    #[test]
    fn freq_and_rate_tables() {
        let freq = available_freq_type();
        assert_eq!(freq.column(0), ["F", "FO", "FQ"]);

        let rate = available_rate_type();
        assert_eq!(rate.column(0), ["", "I", "G", "I+G", "R", "I+R"]);
    }

    #[test]
    fn display_renders_every_row() {
        let text = available_freq_type().to_string();
        assert!(text.starts_with("Available frequency types\n"));
        assert!(text.contains("FO         State frequency optimized"));
        // title, three rules, header and one line per frequency type
        assert_eq!(text.lines().count(), 1 + 3 + 1 + 3);
    }
}
