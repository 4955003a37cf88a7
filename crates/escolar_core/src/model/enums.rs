//! Closed enumerations shared across the academic domain.
//!
//! # Responsibility
//! - Define the four fixed vocabularies: bimester, assessment type,
//!   education level and shift.
//! - Own the canonical storage token for each variant.
//!
//! # Invariants
//! - `as_str` returns the exact token persisted in SQLite and emitted on the
//!   wire; `parse` is its strict inverse.
//! - `parse` never falls back to a default: unknown tokens yield `None` and
//!   the persistence layer turns that into a decode error.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One of the four grading periods of an academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bimester {
    Primeiro,
    Segundo,
    Terceiro,
    Quarto,
}

impl Bimester {
    /// All bimesters in calendar order, for report-card iteration.
    pub const ALL: [Bimester; 4] = [
        Bimester::Primeiro,
        Bimester::Segundo,
        Bimester::Terceiro,
        Bimester::Quarto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primeiro => "PRIMEIRO",
            Self::Segundo => "SEGUNDO",
            Self::Terceiro => "TERCEIRO",
            Self::Quarto => "QUARTO",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PRIMEIRO" => Some(Self::Primeiro),
            "SEGUNDO" => Some(Self::Segundo),
            "TERCEIRO" => Some(Self::Terceiro),
            "QUARTO" => Some(Self::Quarto),
            _ => None,
        }
    }
}

impl Display for Bimester {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of graded activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentType {
    /// Written exam.
    Prova,
    /// Take-home assignment.
    Trabalho,
    Seminario,
    Participacao,
    AtividadePratica,
    Projeto,
}

impl AssessmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prova => "PROVA",
            Self::Trabalho => "TRABALHO",
            Self::Seminario => "SEMINARIO",
            Self::Participacao => "PARTICIPACAO",
            Self::AtividadePratica => "ATIVIDADE_PRATICA",
            Self::Projeto => "PROJETO",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PROVA" => Some(Self::Prova),
            "TRABALHO" => Some(Self::Trabalho),
            "SEMINARIO" => Some(Self::Seminario),
            "PARTICIPACAO" => Some(Self::Participacao),
            "ATIVIDADE_PRATICA" => Some(Self::AtividadePratica),
            "PROJETO" => Some(Self::Projeto),
            _ => None,
        }
    }
}

impl Display for AssessmentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// School education level of a classroom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EducationLevel {
    #[serde(rename = "INFANTIL")]
    Infantil,
    #[serde(rename = "FUNDAMENTAL_I")]
    FundamentalI,
    #[serde(rename = "FUNDAMENTAL_II")]
    FundamentalII,
    #[serde(rename = "MEDIO")]
    Medio,
}

impl EducationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infantil => "INFANTIL",
            Self::FundamentalI => "FUNDAMENTAL_I",
            Self::FundamentalII => "FUNDAMENTAL_II",
            Self::Medio => "MEDIO",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "INFANTIL" => Some(Self::Infantil),
            "FUNDAMENTAL_I" => Some(Self::FundamentalI),
            "FUNDAMENTAL_II" => Some(Self::FundamentalII),
            "MEDIO" => Some(Self::Medio),
            _ => None,
        }
    }
}

impl Display for EducationLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily shift a classroom runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shift {
    Manha,
    Tarde,
    Noite,
    /// Full-day schedule.
    Integral,
}

impl Shift {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manha => "MANHA",
            Self::Tarde => "TARDE",
            Self::Noite => "NOITE",
            Self::Integral => "INTEGRAL",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "MANHA" => Some(Self::Manha),
            "TARDE" => Some(Self::Tarde),
            "NOITE" => Some(Self::Noite),
            "INTEGRAL" => Some(Self::Integral),
            _ => None,
        }
    }
}

impl Display for Shift {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
