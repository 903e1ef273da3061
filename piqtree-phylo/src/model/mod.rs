//! Substitution model vocabulary and the model string grammar.

pub mod compose;
pub mod freq_type;
pub mod rate_type;
pub mod substitution;

pub use compose::{make_model, IntoFreqType, IntoRateModel, IntoSubstitution, Model};
pub use freq_type::FreqType;
pub use rate_type::{RateModel, RateType};
pub use substitution::{AaModel, DnaModel, ModelType, SubstitutionModel};
