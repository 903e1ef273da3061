//! Results of IQ-TREE's ModelFinder.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use piqtree_core::{PiqtreeError, Result, Summarizable};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{make_model, Model};

/// Fit statistics ModelFinder reports for one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelResultValue {
    /// Log-likelihood.
    pub lnl: f64,
    /// Number of free parameters.
    pub nfp: i64,
    /// Sum of branch lengths.
    pub tree_length: f64,
}

impl FromStr for ModelResultValue {
    type Err = PiqtreeError;

    /// Parse IQ-TREE's `"<lnL> <nfp> <tree_length>"`.
    fn from_str(s: &str) -> Result<Self> {
        let err = || PiqtreeError::Parse(format!("Error parsing string '{s}'"));
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [lnl, nfp, tree_length] = fields.as_slice() else {
            return Err(err());
        };
        Ok(Self {
            lnl: lnl.parse().map_err(|_| err())?,
            nfp: nfp.parse().map_err(|_| err())?,
            tree_length: tree_length.parse().map_err(|_| err())?,
        })
    }
}

impl fmt::Display for ModelResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lnl, self.nfp, self.tree_length)
    }
}

/// Information criterion used to rank models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criterion {
    Aic,
    Aicc,
    Bic,
}

impl Criterion {
    pub const ALL: [Self; 3] = [Self::Aic, Self::Aicc, Self::Bic];

    /// Key under which IQ-TREE reports the best model.
    pub fn raw_key(&self) -> &'static str {
        match self {
            Self::Aic => "best_model_AIC",
            Self::Aicc => "best_model_AICc",
            Self::Bic => "best_model_BIC",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Aic => "AIC",
            Self::Aicc => "AICc",
            Self::Bic => "BIC",
        })
    }
}

/// Models evaluated by ModelFinder with their statistics and the best model
/// under each criterion. The three best models are always present in
/// [`model_stats`](Self::model_stats). Models outside the supported
/// vocabulary (`K2P`, `K3Pu`, ...) keep their statistics under their raw
/// names in [`unresolved_stats`](Self::unresolved_stats).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFinderResult {
    source: String,
    model_stats: BTreeMap<Model, ModelResultValue>,
    #[serde(default)]
    unresolved_stats: BTreeMap<String, ModelResultValue>,
    best_aic: Model,
    best_aicc: Model,
    best_bic: Model,
}

impl ModelFinderResult {
    /// Build from ModelFinder's raw YAML mapping.
    ///
    /// Every string-valued entry except those keyed `best_*` or `initTree*`
    /// is a model with its statistics.
    pub fn new(source: impl Into<String>, raw: &serde_yaml::Value) -> Result<Self> {
        let raw = raw.as_mapping().ok_or_else(|| {
            PiqtreeError::MalformedNativeOutput("ModelFinder result is not a mapping.".into())
        })?;

        let mut model_stats = BTreeMap::new();
        let mut unresolved_stats = BTreeMap::new();
        for (key, value) in raw {
            let (Some(key), Some(value)) = (key.as_str(), value.as_str()) else {
                continue;
            };
            if key.starts_with("best_") || key.starts_with("initTree") {
                continue;
            }
            let stats = value.parse()?;
            match make_model(key) {
                Ok(model) => {
                    model_stats.insert(model, stats);
                }
                Err(e) => {
                    debug!(model = key, error = %e, "keeping ModelFinder entry under its raw name");
                    unresolved_stats.insert(key.to_string(), stats);
                }
            }
        }

        let mut best = |criterion: Criterion| -> Result<Model> {
            let name = raw
                .get(criterion.raw_key())
                .and_then(serde_yaml::Value::as_str)
                .ok_or_else(|| {
                    PiqtreeError::MalformedNativeOutput(format!("{} not found.", criterion.raw_key()))
                })?;
            let model = make_model(name)?;
            let stats = raw
                .get(model.to_string().as_str())
                .and_then(serde_yaml::Value::as_str)
                .ok_or_else(|| {
                    PiqtreeError::MalformedNativeOutput(format!("statistics for {model} not found."))
                })?
                .parse()?;
            model_stats.insert(model, stats);
            Ok(model)
        };
        let best_aic = best(Criterion::Aic)?;
        let best_aicc = best(Criterion::Aicc)?;
        let best_bic = best(Criterion::Bic)?;

        Ok(Self {
            source: source.into(),
            model_stats,
            unresolved_stats,
            best_aic,
            best_aicc,
            best_bic,
        })
    }

    /// Parse ModelFinder's YAML text.
    pub fn from_yaml(source: impl Into<String>, text: &str) -> Result<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(text)
            .map_err(|e| PiqtreeError::Parse(format!("ModelFinder YAML: {e}")))?;
        Self::new(source, &raw)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn model_stats(&self) -> &BTreeMap<Model, ModelResultValue> {
        &self.model_stats
    }

    /// Statistics for evaluated models that have no [`Model`] counterpart.
    pub fn unresolved_stats(&self) -> &BTreeMap<String, ModelResultValue> {
        &self.unresolved_stats
    }

    pub fn stats(&self, model: &Model) -> Option<&ModelResultValue> {
        self.model_stats.get(model)
    }

    pub fn best_aic(&self) -> Model {
        self.best_aic
    }

    pub fn best_aicc(&self) -> Model {
        self.best_aicc
    }

    pub fn best_bic(&self) -> Model {
        self.best_bic
    }

    pub fn best_by(&self, criterion: Criterion) -> Model {
        match criterion {
            Criterion::Aic => self.best_aic,
            Criterion::Aicc => self.best_aicc,
            Criterion::Bic => self.best_bic,
        }
    }

    /// Serialisable form: `{version, type, init_kwargs: {raw_data, source}}`
    /// where `raw_data` is in ModelFinder's own format.
    pub fn to_rich_dict(&self) -> serde_json::Value {
        let mut raw_data = serde_json::Map::new();
        for (model, stats) in &self.model_stats {
            raw_data.insert(model.to_string(), stats.to_string().into());
        }
        for (name, stats) in &self.unresolved_stats {
            raw_data.insert(name.clone(), stats.to_string().into());
        }
        for criterion in Criterion::ALL {
            raw_data.insert(
                criterion.raw_key().to_string(),
                self.best_by(criterion).to_string().into(),
            );
        }
        serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "type": std::any::type_name::<Self>(),
            "init_kwargs": {
                "raw_data": raw_data,
                "source": self.source,
            },
        })
    }

    /// Inverse of [`to_rich_dict`](Self::to_rich_dict).
    pub fn from_rich_dict(data: &serde_json::Value) -> Result<Self> {
        let kwargs = data
            .get("init_kwargs")
            .ok_or_else(|| PiqtreeError::Parse("rich dict has no init_kwargs".into()))?;
        let source = kwargs
            .get("source")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| PiqtreeError::Parse("rich dict has no source".into()))?;
        let raw_data = kwargs
            .get("raw_data")
            .ok_or_else(|| PiqtreeError::Parse("rich dict has no raw_data".into()))?;
        let raw = serde_yaml::to_value(raw_data)
            .map_err(|e| PiqtreeError::Parse(format!("rich dict raw_data: {e}")))?;
        Self::new(source, &raw)
    }
}

impl Summarizable for ModelFinderResult {
    fn summary(&self) -> String {
        format!(
            "ModelFinderResult({}): {} models, best AIC {}, AICc {}, BIC {}",
            self.source,
            self.model_stats.len() + self.unresolved_stats.len(),
            self.best_aic,
            self.best_aicc,
            self.best_bic
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(model: &str) -> serde_yaml::Value {
        serde_yaml::from_str(&format!(
            r#"
"{model}": "123.45 10 0.678"
best_model_AIC: "{model}"
best_model_AICc: "{model}"
best_model_BIC: "{model}"
best_tree_AIC: "((a,b),(c,d));"
initTree: "((a,b),(c,d));"
partition_type: 0
"#
        ))
        .unwrap()
    }

    #[test]
    fn result_value_from_string() {
        let v: ModelResultValue = "123.45 10 0.678".parse().unwrap();
        assert_eq!(v.lnl, 123.45);
        assert_eq!(v.nfp, 10);
        assert_eq!(v.tree_length, 0.678);
        assert_eq!(v.to_string(), "123.45 10 0.678");
    }

    #[test]
    fn result_value_from_bad_string() {
        for bad in ["123.45.00 10 0.678", "123.45 10 10 0.678", "123.45 10", "1.0 2.5 3.0"] {
            let err = bad.parse::<ModelResultValue>().unwrap_err();
            assert_eq!(err.to_string(), format!("parse error: Error parsing string '{bad}'"));
        }
    }

    #[test]
    fn best_models_materialised() {
        for name in ["GTR+F", "GTR+F+G"] {
            let result = ModelFinderResult::new("test", &raw(name)).unwrap();
            let model = make_model(name).unwrap();
            assert_eq!(result.best_aic(), model);
            assert_eq!(result.best_by(Criterion::Bic), model);
            let stats = result.stats(&model).unwrap();
            assert_eq!(stats.lnl, 123.45);
            assert_eq!(stats.nfp, 10);
            assert_eq!(result.model_stats().len(), 1);
        }
    }

    #[test]
    fn best_model_without_stats_is_malformed() {
        let raw: serde_yaml::Value = serde_yaml::from_str(
            "best_model_AIC: HKY\nbest_model_AICc: HKY\nbest_model_BIC: HKY\n",
        )
        .unwrap();
        assert!(matches!(
            ModelFinderResult::new("x", &raw),
            Err(PiqtreeError::MalformedNativeOutput(_))
        ));
    }

    #[test]
    fn distinct_best_models() {
        let raw: serde_yaml::Value = serde_yaml::from_str(
            r#"
"HKY+G4": "-100.5 9 1.5"
"GTR+F+I": "-98.25 14 1.6"
"JC": "-120 5 1.4"
best_model_AIC: "GTR+F+I"
best_model_AICc: "GTR+F+I"
best_model_BIC: "HKY+G4"
"#,
        )
        .unwrap();
        let result = ModelFinderResult::new("brca1.fasta", &raw).unwrap();
        assert_eq!(result.model_stats().len(), 3);
        assert_eq!(result.best_bic().to_string(), "HKY+G4");
        assert_eq!(result.best_aicc().to_string(), "GTR+F+I");
        assert!(result.summary().contains("BIC HKY+G4"));
    }

    #[test]
    fn unsupported_model_names_kept_raw() {
        let raw: serde_yaml::Value = serde_yaml::from_str(
            r#"
"K2P+G4": "-101.0 6 1.5"
"K3Pu+F": "-102.5 8 1.5"
"HKY+G4": "-100.5 9 1.5"
best_model_AIC: "HKY+G4"
best_model_AICc: "HKY+G4"
best_model_BIC: "HKY+G4"
"#,
        )
        .unwrap();
        let result = ModelFinderResult::new("default set", &raw).unwrap();
        assert_eq!(result.best_bic().to_string(), "HKY+G4");
        assert_eq!(result.model_stats().len(), 1);
        assert_eq!(result.unresolved_stats()["K2P+G4"].lnl, -101.0);
        assert_eq!(result.unresolved_stats()["K3Pu+F"].nfp, 8);
        assert!(result.summary().contains("3 models"));

        let back = ModelFinderResult::from_rich_dict(&result.to_rich_dict()).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn rich_dict_round_trip() {
        let result = ModelFinderResult::new("test", &raw("TIM2+FO+I+R3")).unwrap();
        let rich = result.to_rich_dict();
        assert_eq!(rich["init_kwargs"]["source"], "test");
        assert_eq!(rich["init_kwargs"]["raw_data"]["best_model_BIC"], "TIM2+FO+I+R3");
        assert!(rich["type"].as_str().unwrap().ends_with("ModelFinderResult"));

        let back = ModelFinderResult::from_rich_dict(&rich).unwrap();
        assert_eq!(back, result);
        for criterion in Criterion::ALL {
            assert_eq!(back.best_by(criterion), result.best_by(criterion));
        }
    }

    #[test]
    fn rich_dict_requires_kwargs() {
        assert!(ModelFinderResult::from_rich_dict(&serde_json::json!({"version": "0"})).is_err());
    }

    #[test]
    fn serde_round_trip() {
        let result = ModelFinderResult::new("test", &raw("K80+G")).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let back: ModelFinderResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
