//! Brand setup data: the brand itself and the products, topics, personas and
//! questions picked in the wizard.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WizardError;

use super::state::WizardStep;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

/// The brand being set up. Held in wizard memory until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandEntity {
    pub name: String,
    #[serde(default)]
    pub aliases: BTreeSet<String>,
    pub website: String,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
}

impl BrandEntity {
    /// Build from user input: trims fields, drops blank aliases and links.
    pub fn from_input(
        name: &str,
        aliases: impl IntoIterator<Item = String>,
        website: &str,
        social_links: Vec<SocialLink>,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            aliases: aliases
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
            website: website.trim().to_string(),
            social_links: social_links
                .into_iter()
                .map(|l| SocialLink {
                    platform: l.platform.trim().to_string(),
                    url: l.url.trim().to_string(),
                })
                .filter(|l| !l.platform.is_empty() && !l.url.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Ordered as entered.
    #[serde(default)]
    pub value_propositions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_product_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub goals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub motivators: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demographics: Option<Demographics>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topic_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Neutral => write!(f, "neutral"),
            Self::Negative => write!(f, "negative"),
        }
    }
}

impl std::str::FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            other => Err(format!("unknown sentiment: {other}")),
        }
    }
}

/// What one AI model answered to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub model: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hallucination: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<ModelResponse>,
}

/// The four kinds of item collected by the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Product,
    Topic,
    Persona,
    Question,
}

impl ItemKind {
    /// The step on which items of this kind are picked.
    pub fn owner_step(&self) -> WizardStep {
        match self {
            Self::Product => WizardStep::BrandInfo,
            Self::Topic => WizardStep::Topics,
            Self::Persona => WizardStep::Personas,
            Self::Question => WizardStep::Questions,
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Product => "product",
            Self::Topic => "topic",
            Self::Persona => "persona",
            Self::Question => "question",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ItemKind {
    type Err = WizardError;

    /// Accepts singular and plural forms (`topic`, `topics`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" | "products" => Ok(Self::Product),
            "topic" | "topics" => Ok(Self::Topic),
            "persona" | "personas" => Ok(Self::Persona),
            "question" | "questions" => Ok(Self::Question),
            other => Err(WizardError::UnknownKind(other.to_string())),
        }
    }
}

/// A single item added to the wizard, tagged by kind on the wire:
/// `{"kind": "topic", "item": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "item", rename_all = "snake_case")]
pub enum WizardItem {
    Product(Product),
    Topic(Topic),
    Persona(Persona),
    Question(Question),
}

impl WizardItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Product(_) => ItemKind::Product,
            Self::Topic(_) => ItemKind::Topic,
            Self::Persona(_) => ItemKind::Persona,
            Self::Question(_) => ItemKind::Question,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Product(p) => &p.id,
            Self::Topic(t) => &t.id,
            Self::Persona(p) => &p.id,
            Self::Question(q) => &q.id,
        }
    }

    /// Reject items without an id or a display name/text.
    pub fn validate(&self) -> Result<(), WizardError> {
        if self.id().trim().is_empty() {
            return Err(WizardError::InvalidField {
                field: format!("{}.id", self.kind()),
                reason: "must not be empty".into(),
            });
        }
        let (field, value) = match self {
            Self::Product(p) => ("product.name", &p.name),
            Self::Topic(t) => ("topic.name", &t.name),
            Self::Persona(p) => ("persona.name", &p.name),
            Self::Question(q) => ("question.text", &q.text),
        };
        if value.trim().is_empty() {
            return Err(WizardError::InvalidField {
                field: field.into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}
