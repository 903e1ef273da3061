//! Substitution model vocabulary: nucleotide and amino-acid models known to
//! IQ-TREE, each with its canonical token and a description.

use std::fmt;
use std::str::FromStr;

use piqtree_core::{Annotated, PiqtreeError, Result};
use serde::{Deserialize, Serialize};

/// Whether a model describes nucleotide or protein evolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Nucleotide,
    Protein,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nucleotide => "nucleotide",
            Self::Protein => "protein",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nucleotide substitution models, including the Lie-Markov family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DnaModel {
    JC,
    F81,
    K80,
    HKY,
    TN,
    TNe,
    K81,
    K81u,
    TPM2,
    TPM2u,
    TPM3,
    TPM3u,
    TIM,
    TIMe,
    TIM2,
    TIM2e,
    TIM3,
    TIM3e,
    TVM,
    TVMe,
    SYM,
    GTR,
    Lie1_1,
    Lie2_2b,
    Lie3_3a,
    Lie3_3b,
    Lie3_3c,
    Lie3_4,
    Lie4_4a,
    Lie4_4b,
    Lie4_5a,
    Lie4_5b,
    Lie5_6a,
    Lie5_6b,
    Lie5_7a,
    Lie5_7b,
    Lie5_7c,
    Lie5_11a,
    Lie5_11b,
    Lie5_11c,
    Lie5_16,
    Lie6_6,
    Lie6_7a,
    Lie6_7b,
    Lie6_8a,
    Lie6_8b,
    Lie6_17a,
    Lie6_17b,
    Lie8_8,
    Lie8_10a,
    Lie8_10b,
    Lie8_16,
    Lie8_17,
    Lie8_18,
    Lie9_20a,
    Lie9_20b,
    Lie10_12,
    Lie10_34,
    Lie12_12,
}

impl DnaModel {
    pub const ALL: [Self; 59] = [
        Self::JC,
        Self::F81,
        Self::K80,
        Self::HKY,
        Self::TN,
        Self::TNe,
        Self::K81,
        Self::K81u,
        Self::TPM2,
        Self::TPM2u,
        Self::TPM3,
        Self::TPM3u,
        Self::TIM,
        Self::TIMe,
        Self::TIM2,
        Self::TIM2e,
        Self::TIM3,
        Self::TIM3e,
        Self::TVM,
        Self::TVMe,
        Self::SYM,
        Self::GTR,
        Self::Lie1_1,
        Self::Lie2_2b,
        Self::Lie3_3a,
        Self::Lie3_3b,
        Self::Lie3_3c,
        Self::Lie3_4,
        Self::Lie4_4a,
        Self::Lie4_4b,
        Self::Lie4_5a,
        Self::Lie4_5b,
        Self::Lie5_6a,
        Self::Lie5_6b,
        Self::Lie5_7a,
        Self::Lie5_7b,
        Self::Lie5_7c,
        Self::Lie5_11a,
        Self::Lie5_11b,
        Self::Lie5_11c,
        Self::Lie5_16,
        Self::Lie6_6,
        Self::Lie6_7a,
        Self::Lie6_7b,
        Self::Lie6_8a,
        Self::Lie6_8b,
        Self::Lie6_17a,
        Self::Lie6_17b,
        Self::Lie8_8,
        Self::Lie8_10a,
        Self::Lie8_10b,
        Self::Lie8_16,
        Self::Lie8_17,
        Self::Lie8_18,
        Self::Lie9_20a,
        Self::Lie9_20b,
        Self::Lie10_12,
        Self::Lie10_34,
        Self::Lie12_12,
    ];

    /// The token IQ-TREE uses for this model.
    pub fn iqtree_str(&self) -> &'static str {
        match self {
            Self::JC => "JC",
            Self::F81 => "F81",
            Self::K80 => "K80",
            Self::HKY => "HKY",
            Self::TN => "TN",
            Self::TNe => "TNe",
            Self::K81 => "K81",
            Self::K81u => "K81u",
            Self::TPM2 => "TPM2",
            Self::TPM2u => "TPM2u",
            Self::TPM3 => "TPM3",
            Self::TPM3u => "TPM3u",
            Self::TIM => "TIM",
            Self::TIMe => "TIMe",
            Self::TIM2 => "TIM2",
            Self::TIM2e => "TIM2e",
            Self::TIM3 => "TIM3",
            Self::TIM3e => "TIM3e",
            Self::TVM => "TVM",
            Self::TVMe => "TVMe",
            Self::SYM => "SYM",
            Self::GTR => "GTR",
            Self::Lie1_1 => "1.1",
            Self::Lie2_2b => "2.2b",
            Self::Lie3_3a => "3.3a",
            Self::Lie3_3b => "3.3b",
            Self::Lie3_3c => "3.3c",
            Self::Lie3_4 => "3.4",
            Self::Lie4_4a => "4.4a",
            Self::Lie4_4b => "4.4b",
            Self::Lie4_5a => "4.5a",
            Self::Lie4_5b => "4.5b",
            Self::Lie5_6a => "5.6a",
            Self::Lie5_6b => "5.6b",
            Self::Lie5_7a => "5.7a",
            Self::Lie5_7b => "5.7b",
            Self::Lie5_7c => "5.7c",
            Self::Lie5_11a => "5.11a",
            Self::Lie5_11b => "5.11b",
            Self::Lie5_11c => "5.11c",
            Self::Lie5_16 => "5.16",
            Self::Lie6_6 => "6.6",
            Self::Lie6_7a => "6.7a",
            Self::Lie6_7b => "6.7b",
            Self::Lie6_8a => "6.8a",
            Self::Lie6_8b => "6.8b",
            Self::Lie6_17a => "6.17a",
            Self::Lie6_17b => "6.17b",
            Self::Lie8_8 => "8.8",
            Self::Lie8_10a => "8.10a",
            Self::Lie8_10b => "8.10b",
            Self::Lie8_16 => "8.16",
            Self::Lie8_17 => "8.17",
            Self::Lie8_18 => "8.18",
            Self::Lie9_20a => "9.20a",
            Self::Lie9_20b => "9.20b",
            Self::Lie10_12 => "10.12",
            Self::Lie10_34 => "10.34",
            Self::Lie12_12 => "12.12",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::JC => {
                "Equal substitution rates and equal base frequencies (Jukes and Cantor, 1969)."
            }
            Self::F81 => "Equal rates but unequal base freq. (Felsenstein, 1981).",
            Self::K80 => {
                "Unequal transition/transversion rates and equal base freq. (Kimura, 1980)."
            }
            Self::HKY => {
                "Unequal transition/transversion rates and unequal base freq. (Hasegawa, Kishino and Yano, 1985)."
            }
            Self::TN => {
                "Like HKY but unequal purine/pyrimidine rates (Tamura and Nei, 1993)."
            }
            Self::TNe => "Like TN but equal base freq.",
            Self::K81 => {
                "Three substitution types model and equal base freq. (Kimura, 1981)."
            }
            Self::K81u => "Like K81 but unequal base freq.",
            Self::TPM2 => "AC=AT, AG=CT, CG=GT and equal base freq.",
            Self::TPM2u => "Like TPM2 but unequal base freq.",
            Self::TPM3 => "AC=CG, AG=CT, AT=GT and equal base freq.",
            Self::TPM3u => "Like TPM3 but unequal base freq.",
            Self::TIM => "Transition model, AC=GT, AT=CG and unequal base freq.",
            Self::TIMe => "Like TIM but equal base freq.",
            Self::TIM2 => "AC=AT, CG=GT and unequal base freq.",
            Self::TIM2e => "Like TIM2 but equal base freq.",
            Self::TIM3 => "AC=CG, AT=GT and unequal base freq.",
            Self::TIM3e => "Like TIM3 but equal base freq.",
            Self::TVM => "Transversion model, AG=CT and unequal base freq.",
            Self::TVMe => "Like TVM but equal base freq.",
            Self::SYM => {
                "Symmetric model with unequal rates but equal base freq. (Zharkikh, 1994)."
            }
            Self::GTR => {
                "General time reversible model with unequal rates and unequal base freq. (Tavare, 1986)."
            }
            Self::Lie1_1 => "Reversible model. Equal base frequencies. equiv. to JC",
            Self::Lie2_2b => "Reversible model. Equal base frequencies. equiv. to K2P",
            Self::Lie3_3a => "Reversible model. Equal base frequencies. equiv. to K3P",
            Self::Lie3_3b => "Non-reversible model. Equal base frequencies.",
            Self::Lie3_3c => "Reversible model. Equal base frequencies. equiv. to TNe",
            Self::Lie3_4 => "Reversible model. f(A)=f(G) and f(C)=f(T).",
            Self::Lie4_4a => {
                "Reversible model. Unconstrained base frequencies. equiv. to F81"
            }
            Self::Lie4_4b => "Reversible model. f(A)=f(G) and f(C)=f(T).",
            Self::Lie4_5a => "Non-reversible model. f(A)=f(G) and f(C)=f(T).",
            Self::Lie4_5b => "Non-reversible model. f(A)=f(G) and f(C)=f(T).",
            Self::Lie5_6a => "Non-reversible model. Equal base frequencies.",
            Self::Lie5_6b => "Non-reversible model. Unconstrained base frequencies.",
            Self::Lie5_7a => "Non-reversible model. f(A)+f(G)=0.5=f(C)+f(T).",
            Self::Lie5_7b => "Non-reversible model. Equal base frequencies.",
            Self::Lie5_7c => "Non-reversible model. Equal base frequencies.",
            Self::Lie5_11a => "Non-reversible model. f(A)+f(G)=0.5=f(C)+f(T).",
            Self::Lie5_11b => "Non-reversible model. Equal base frequencies.",
            Self::Lie5_11c => "Non-reversible model. Equal base frequencies.",
            Self::Lie5_16 => "Non-reversible model. f(A)=f(G) and f(C)=f(T).",
            Self::Lie6_6 => {
                "Non-reversible model. f(A)=f(G) and f(C)=f(T). equiv. to STRSYM for strand-symmetric model (Bielawski and Gold, 2002)"
            }
            Self::Lie6_7a => {
                "Non-reversible model. Unconstrained base frequencies. F81+K3P"
            }
            Self::Lie6_7b => "Non-reversible model. Unconstrained base frequencies.",
            Self::Lie6_8a => "Non-reversible model. Unconstrained base frequencies.",
            Self::Lie6_8b => "Non-reversible model. f(A)=f(G) and f(C)=f(T).",
            Self::Lie6_17a => "Non-reversible model. f(A)=f(G) and f(C)=f(T).",
            Self::Lie6_17b => "Non-reversible model. f(A)=f(G) and f(C)=f(T).",
            Self::Lie8_8 => "Non-reversible model. Unconstrained base frequencies.",
            Self::Lie8_10a => "Non-reversible model. Unconstrained base frequencies.",
            Self::Lie8_10b => "Non-reversible model. f(A)=f(G) and f(C)=f(T).",
            Self::Lie8_16 => "Non-reversible model. Unconstrained base frequencies.",
            Self::Lie8_17 => "Non-reversible model. Unconstrained base frequencies.",
            Self::Lie8_18 => "Non-reversible model. Unconstrained base frequencies.",
            Self::Lie9_20a => "Non-reversible model. f(A)+f(G)=0.5=f(C)+f(T).",
            Self::Lie9_20b => {
                "Non-reversible model. Equal base frequencies. Doubly stochastic"
            }
            Self::Lie10_12 => "Non-reversible model. Unconstrained base frequencies.",
            Self::Lie10_34 => "Non-reversible model. Unconstrained base frequencies.",
            Self::Lie12_12 => {
                "Non-reversible model. Unconstrained base frequencies. equiv. to UNREST (unrestricted model)"
            }
        }
    }

    /// True for the Lie-Markov models, whose tokens start with a digit.
    pub fn is_lie_markov(&self) -> bool {
        self.iqtree_str().as_bytes()[0].is_ascii_digit()
    }

    /// Exact lookup restricted to the Lie-Markov family.
    pub fn from_lie_token(token: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(Self::is_lie_markov)
            .find(|m| m.iqtree_str() == token)
    }

    /// Exact, case-sensitive lookup by token.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.iqtree_str() == token)
    }
}

/// Amino-acid substitution models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AaModel {
    Blosum62,
    CpREV,
    Dayhoff,
    DCMut,
    EAL,
    ELM,
    FLAVI,
    FLU,
    GTR20,
    HIVb,
    HIVw,
    JTT,
    JTTDCMut,
    LG,
    MtART,
    MtMAM,
    MtREV,
    MtZOA,
    MtMet,
    MtVer,
    MtInv,
    NqBird,
    NqInsect,
    NqMammal,
    NqPfam,
    NqPlant,
    NqYeast,
    Poisson,
    PMB,
    QBird,
    QInsect,
    QMammal,
    QPfam,
    QPlant,
    QYeast,
    RtREV,
    VT,
    WAG,
}

impl AaModel {
    pub const ALL: [Self; 38] = [
        Self::Blosum62,
        Self::CpREV,
        Self::Dayhoff,
        Self::DCMut,
        Self::EAL,
        Self::ELM,
        Self::FLAVI,
        Self::FLU,
        Self::GTR20,
        Self::HIVb,
        Self::HIVw,
        Self::JTT,
        Self::JTTDCMut,
        Self::LG,
        Self::MtART,
        Self::MtMAM,
        Self::MtREV,
        Self::MtZOA,
        Self::MtMet,
        Self::MtVer,
        Self::MtInv,
        Self::NqBird,
        Self::NqInsect,
        Self::NqMammal,
        Self::NqPfam,
        Self::NqPlant,
        Self::NqYeast,
        Self::Poisson,
        Self::PMB,
        Self::QBird,
        Self::QInsect,
        Self::QMammal,
        Self::QPfam,
        Self::QPlant,
        Self::QYeast,
        Self::RtREV,
        Self::VT,
        Self::WAG,
    ];

    /// The token IQ-TREE uses for this model.
    pub fn iqtree_str(&self) -> &'static str {
        match self {
            Self::Blosum62 => "Blosum62",
            Self::CpREV => "cpREV",
            Self::Dayhoff => "Dayhoff",
            Self::DCMut => "DCMut",
            Self::EAL => "EAL",
            Self::ELM => "ELM",
            Self::FLAVI => "FLAVI",
            Self::FLU => "FLU",
            Self::GTR20 => "GTR20",
            Self::HIVb => "HIVb",
            Self::HIVw => "HIVw",
            Self::JTT => "JTT",
            Self::JTTDCMut => "JTTDCMut",
            Self::LG => "LG",
            Self::MtART => "mtART",
            Self::MtMAM => "mtMAM",
            Self::MtREV => "mtREV",
            Self::MtZOA => "mtZOA",
            Self::MtMet => "mtMet",
            Self::MtVer => "mtVer",
            Self::MtInv => "mtInv",
            Self::NqBird => "NQ.bird",
            Self::NqInsect => "NQ.insect",
            Self::NqMammal => "NQ.mammal",
            Self::NqPfam => "NQ.pfam",
            Self::NqPlant => "NQ.plant",
            Self::NqYeast => "NQ.yeast",
            Self::Poisson => "Poisson",
            Self::PMB => "PMB",
            Self::QBird => "Q.bird",
            Self::QInsect => "Q.insect",
            Self::QMammal => "Q.mammal",
            Self::QPfam => "Q.pfam",
            Self::QPlant => "Q.plant",
            Self::QYeast => "Q.yeast",
            Self::RtREV => "rtREV",
            Self::VT => "VT",
            Self::WAG => "WAG",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Blosum62 => {
                "BLOcks SUbstitution Matrix (Henikoff and Henikoff, 1992). Note that BLOSUM62 is not recommended for phylogenetic analysis as it was designed mainly for sequence alignments."
            }
            Self::CpREV => "chloroplast matrix (Adachi et al., 2000).",
            Self::Dayhoff => "General matrix (Dayhoff et al., 1978).",
            Self::DCMut => "Revised Dayhoff matrix (Kosiol and Goldman, 2005).",
            Self::EAL => {
                "General matrix. To be used with profile mixture models (for eg. EAL+C60) for reconstructing relationships between eukaryotes and Archaea (Banos et al., 2024)."
            }
            Self::ELM => {
                "General matrix. To be used with profile mixture models (for eg. ELM+C60) for phylogenetic analysis of proteins encoded by nuclear genomes of eukaryotes (Banos et al., 2024)."
            }
            Self::FLAVI => "Flavivirus (Le and Vinh, 2020).",
            Self::FLU => "Influenza virus (Dang et al., 2010).",
            Self::GTR20 => "General time reversible models with 190 rate parameters.",
            Self::HIVb => "HIV between-patient matrix HIV-Bm (Nickle et al., 2007).",
            Self::HIVw => "HIV within-patient matrix HIV-Wm (Nickle et al., 2007).",
            Self::JTT => "General matrix (Jones et al., 1992).",
            Self::JTTDCMut => "Revised JTT matrix (Kosiol and Goldman, 2005).",
            Self::LG => "General matrix (Le and Gascuel, 2008).",
            Self::MtART => "Mitochondrial Arthropoda (Abascal et al., 2007).",
            Self::MtMAM => "Mitochondrial Mammalia (Yang et al., 1998).",
            Self::MtREV => "Mitochondrial Vertebrate (Adachi and Hasegawa, 1996).",
            Self::MtZOA => {
                "Mitochondrial Metazoa (Animals) (Rota-Stabelli et al., 2009)."
            }
            Self::MtMet => "Mitochondrial Metazoa (Vinh et al., 2017).",
            Self::MtVer => "Mitochondrial Vertebrate (Vinh et al., 2017).",
            Self::MtInv => "Mitochondrial Invertebrate (Vinh et al., 2017).",
            Self::NqBird => {
                "Non-reversible Q matrix (Dang et al., 2022) estimated for birds (Jarvis et al., 2015)."
            }
            Self::NqInsect => {
                "Non-reversible Q matrix (Dang et al., 2022) estimated for insects (Misof et al., 2014)."
            }
            Self::NqMammal => {
                "Non-reversible Q matrix (Dang et al., 2022) estimated for mammals (Wu et al., 2018)."
            }
            Self::NqPfam => {
                "General non-reversible Q matrix (Dang et al., 2022) estimated from Pfam version 31 database (El-Gebali et al., 2018)."
            }
            Self::NqPlant => {
                "Non-reversible Q matrix (Dang et al., 2022) estimated for plants (Ran et al., 2018)."
            }
            Self::NqYeast => {
                "Non-reversible Q matrix (Dang et al., 2022) estimated for yeasts (Shen et al., 2018)."
            }
            Self::Poisson => "Equal amino-acid exchange rates and frequencies.",
            Self::PMB => {
                "Probability Matrix from Blocks, revised BLOSUM matrix (Veerassamy et al., 2004)."
            }
            Self::QBird => {
                "Q matrix (Minh et al., 2021) estimated for birds (Jarvis et al., 2015)."
            }
            Self::QInsect => {
                "Q matrix (Minh et al., 2021) estimated for insects (Misof et al., 2014)."
            }
            Self::QMammal => {
                "Q matrix (Minh et al., 2021) estimated for mammals (Wu et al., 2018)."
            }
            Self::QPfam => {
                "General Q matrix (Minh et al., 2021) estimated from Pfam version 31 database (El-Gebali et al., 2018)."
            }
            Self::QPlant => {
                "Q matrix (Minh et al., 2021) estimated for plants (Ran et al., 2018)."
            }
            Self::QYeast => {
                "Q matrix (Minh et al., 2021) estimated for yeasts (Shen et al., 2018)."
            }
            Self::RtREV => "Retrovirus (Dimmic et al., 2002).",
            Self::VT => "General 'Variable Time' matrix (Mueller and Vingron, 2000).",
            Self::WAG => "General matrix (Whelan and Goldman, 2001).",
        }
    }

    /// Exact, case-sensitive lookup by token.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.iqtree_str() == token)
    }
}

/// A substitution model from either family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubstitutionModel {
    Dna(DnaModel),
    Aa(AaModel),
}

impl SubstitutionModel {
    /// Every model, nucleotide first.
    pub fn all() -> impl Iterator<Item = SubstitutionModel> {
        DnaModel::ALL
            .iter()
            .copied()
            .map(Self::Dna)
            .chain(AaModel::ALL.iter().copied().map(Self::Aa))
    }

    pub fn iqtree_str(&self) -> &'static str {
        match self {
            Self::Dna(m) => m.iqtree_str(),
            Self::Aa(m) => m.iqtree_str(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Dna(m) => m.description(),
            Self::Aa(m) => m.description(),
        }
    }

    pub fn model_type(&self) -> ModelType {
        match self {
            Self::Dna(_) => ModelType::Nucleotide,
            Self::Aa(_) => ModelType::Protein,
        }
    }

    pub fn as_dna(&self) -> Option<DnaModel> {
        match self {
            Self::Dna(m) => Some(*m),
            Self::Aa(_) => None,
        }
    }
}

impl From<DnaModel> for SubstitutionModel {
    fn from(m: DnaModel) -> Self {
        Self::Dna(m)
    }
}

impl From<AaModel> for SubstitutionModel {
    fn from(m: AaModel) -> Self {
        Self::Aa(m)
    }
}

impl FromStr for SubstitutionModel {
    type Err = PiqtreeError;

    /// Resolve a token such as `GTR`, `+LG`, `NQ.bird` or `3.3a`.
    ///
    /// Tokens starting with a digit are looked up in the Lie-Markov family
    /// first; otherwise protein models are tried before nucleotide models.
    fn from_str(s: &str) -> Result<Self> {
        let token = s.strip_prefix('+').unwrap_or(s);
        let first = token
            .chars()
            .next()
            .ok_or_else(|| PiqtreeError::UnknownModel(s.to_string()))?;

        if first.is_ascii_digit() {
            if let Some(m) = DnaModel::from_lie_token(token) {
                return Ok(Self::Dna(m));
            }
        }
        AaModel::from_token(token)
            .map(Self::Aa)
            .or_else(|| DnaModel::from_token(token).map(Self::Dna))
            .ok_or_else(|| PiqtreeError::UnknownModel(s.to_string()))
    }
}

impl fmt::Display for SubstitutionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.iqtree_str())
    }
}

impl Annotated for SubstitutionModel {
    fn name(&self) -> &str {
        self.iqtree_str()
    }

    fn description(&self) -> Option<&str> {
        Some(SubstitutionModel::description(self))
    }
}

impl Serialize for SubstitutionModel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.iqtree_str())
    }
}

impl<'de> Deserialize<'de> for SubstitutionModel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_across_families() {
        let mut tokens: Vec<&str> = SubstitutionModel::all().map(|m| m.iqtree_str()).collect();
        let n = tokens.len();
        tokens.sort_unstable();
        tokens.dedup();
        assert_eq!(tokens.len(), n);
        assert_eq!(n, 59 + 38);
    }

    #[test]
    fn every_token_resolves_to_itself() {
        for m in SubstitutionModel::all() {
            assert_eq!(m.iqtree_str().parse::<SubstitutionModel>().unwrap(), m);
        }
    }

    #[test]
    fn leading_plus_is_stripped() {
        let m: SubstitutionModel = "+GTR".parse().unwrap();
        assert_eq!(m, SubstitutionModel::Dna(DnaModel::GTR));
    }

    #[test]
    fn dotted_and_numeric_tokens() {
        assert_eq!(
            "NQ.plant".parse::<SubstitutionModel>().unwrap(),
            SubstitutionModel::Aa(AaModel::NqPlant)
        );
        assert_eq!(
            "3.3a".parse::<SubstitutionModel>().unwrap(),
            SubstitutionModel::Dna(DnaModel::Lie3_3a)
        );
        assert!(DnaModel::Lie12_12.is_lie_markov());
        assert!(!DnaModel::GTR.is_lie_markov());
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!("gtr".parse::<SubstitutionModel>().is_err());
        assert!("lg".parse::<SubstitutionModel>().is_err());
    }

    #[test]
    fn unknown_model_names_input() {
        let err = "GYR".parse::<SubstitutionModel>().unwrap_err();
        assert!(matches!(err, PiqtreeError::UnknownModel(ref s) if s == "GYR"));
        assert!("".parse::<SubstitutionModel>().is_err());
        assert!("+".parse::<SubstitutionModel>().is_err());
    }

    #[test]
    fn model_types() {
        assert_eq!(SubstitutionModel::from(DnaModel::HKY).model_type(), ModelType::Nucleotide);
        assert_eq!(SubstitutionModel::from(AaModel::WAG).model_type(), ModelType::Protein);
        assert!(AaModel::MtInv.description().contains("Invertebrate"));
    }
}
