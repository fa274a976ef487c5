use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    ActiveModifier, Artifact, ArtifactHolding, Spell, SpellDue, SpellHolding,
};

#[derive(Debug, Deserialize)]
pub struct CreateArtifactRequestDto {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ArtifactResponseDto {
    pub id: String,
    pub name: String,
    pub title: String,
    pub description: String,
}

impl From<Artifact> for ArtifactResponseDto {
    fn from(artifact: Artifact) -> Self {
        Self {
            id: artifact.id.to_string(),
            name: artifact.name,
            title: artifact.title,
            description: artifact.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSpellRequestDto {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub due_days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SpellResponseDto {
    pub id: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub due_days: i64,
}

impl From<Spell> for SpellResponseDto {
    fn from(spell: Spell) -> Self {
        Self {
            id: spell.id.to_string(),
            name: spell.name,
            title: spell.title,
            description: spell.description,
            price: spell.price,
            due_days: spell.due_days,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HoldingResponseDto {
    pub id: String,
    pub name: String,
    pub amount: i64,
}

impl From<ArtifactHolding> for HoldingResponseDto {
    fn from(holding: ArtifactHolding) -> Self {
        Self {
            id: holding.id.to_string(),
            name: holding.artifact_name,
            amount: holding.amount,
        }
    }
}

impl From<SpellHolding> for HoldingResponseDto {
    fn from(holding: SpellHolding) -> Self {
        Self {
            id: holding.id.to_string(),
            name: holding.spell_name,
            amount: holding.amount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SpellDueResponseDto {
    pub id: String,
    pub spell: String,
    pub source_id: String,
    pub due: DateTime<Utc>,
}

impl From<SpellDue> for SpellDueResponseDto {
    fn from(due: SpellDue) -> Self {
        Self {
            id: due.id.to_string(),
            spell: due.spell_name,
            source_id: due.source_id.to_string(),
            due: due.due,
        }
    }
}

/// A modifier affecting a player: artifact holdings carry an amount,
/// active spells carry an expiry.
#[derive(Debug, Serialize)]
pub struct ModifierResponseDto {
    pub kind: &'static str,
    pub name: String,
    pub amount: Option<i64>,
    pub due: Option<DateTime<Utc>>,
}

impl From<ActiveModifier> for ModifierResponseDto {
    fn from(modifier: ActiveModifier) -> Self {
        match modifier {
            ActiveModifier::Artifact(holding) => Self {
                kind: "artifact",
                name: holding.artifact_name,
                amount: Some(holding.amount),
                due: None,
            },
            ActiveModifier::SpellDue(due) => Self {
                kind: "spell",
                name: due.spell_name,
                amount: None,
                due: Some(due.due),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GiveModifierRequestDto {
    pub modifier: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct UseModifierRequestDto {
    pub modifier: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct AddSpellRequestDto {
    pub spell_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CastSpellRequestDto {
    pub spell_id: String,
    pub source_id: String,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CastSpellResponseDto {
    pub cast: bool,
}
