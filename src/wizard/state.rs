//! Brand setup wizard state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WizardError;
use crate::notify::Notification;

use super::model::{BrandEntity, ItemKind, Persona, Product, Question, Topic, WizardItem};

/// The wizard steps, in order.
///
/// Progresses linearly: BrandInfo → Topics → Personas → Questions → Review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    BrandInfo,
    Topics,
    Personas,
    Questions,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::BrandInfo,
        WizardStep::Topics,
        WizardStep::Personas,
        WizardStep::Questions,
        WizardStep::Review,
    ];

    /// Zero-based position in the sequence.
    pub fn index(&self) -> usize {
        match self {
            Self::BrandInfo => 0,
            Self::Topics => 1,
            Self::Personas => 2,
            Self::Questions => 3,
            Self::Review => 4,
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn prev(&self) -> Option<WizardStep> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Whether this step is terminal (submit-only).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Review)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::BrandInfo => "Brand info",
            Self::Topics => "Topics",
            Self::Personas => "Personas",
            Self::Questions => "Questions",
            Self::Review => "Review",
        }
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::BrandInfo
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::BrandInfo => "brand-info",
            Self::Topics => "topics",
            Self::Personas => "personas",
            Self::Questions => "questions",
            Self::Review => "review",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for WizardStep {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.to_string() == s)
            .ok_or_else(|| WizardError::InvalidField {
                field: "step".into(),
                reason: format!("unknown step {s}"),
            })
    }
}

/// One row of the step indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    pub step: WizardStep,
    pub title: &'static str,
    pub complete: bool,
    pub current: bool,
}

/// In-memory state of one brand setup wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardState {
    pub id: Uuid,
    /// Email of the session that created the wizard.
    pub owner: String,
    pub current_step: WizardStep,
    pub brand: BrandEntity,
    pub products: Vec<Product>,
    pub topics: Vec<Topic>,
    pub personas: Vec<Persona>,
    pub questions: Vec<Question>,
    pub submitted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WizardState {
    pub fn new(owner: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            current_step: WizardStep::default(),
            brand: BrandEntity::default(),
            products: Vec::new(),
            topics: Vec::new(),
            personas: Vec::new(),
            questions: Vec::new(),
            submitted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Step-local validation. The error is the notification to show.
    pub fn validate(&self, step: WizardStep) -> Result<(), Notification> {
        match step {
            WizardStep::BrandInfo => {
                if self.brand.name.trim().is_empty() {
                    return Err(Notification::error("Brand name required")
                        .with_description("Enter your brand name to continue."));
                }
                if self.brand.website.trim().is_empty() {
                    return Err(Notification::error("Website required")
                        .with_description("Enter your brand website to continue."));
                }
                require_any(&self.products, "products")
            }
            WizardStep::Topics => require_any(&self.topics, "topics"),
            WizardStep::Personas => require_any(&self.personas, "personas"),
            WizardStep::Questions => require_any(&self.questions, "questions"),
            WizardStep::Review => Ok(()),
        }
    }

    /// Checkmark state for the step indicator. Review counts as complete once
    /// the wizard is submitted.
    pub fn is_complete(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::BrandInfo => {
                !self.brand.name.trim().is_empty()
                    && !self.brand.website.trim().is_empty()
                    && !self.products.is_empty()
            }
            WizardStep::Topics => !self.topics.is_empty(),
            WizardStep::Personas => !self.personas.is_empty(),
            WizardStep::Questions => !self.questions.is_empty(),
            WizardStep::Review => self.submitted,
        }
    }

    pub fn step_summaries(&self) -> Vec<StepSummary> {
        WizardStep::ALL
            .into_iter()
            .map(|step| StepSummary {
                step,
                title: step.title(),
                complete: self.is_complete(step),
                current: step == self.current_step,
            })
            .collect()
    }

    /// Move forward one step if the current step validates.
    pub fn next_step(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_open()?;
        let current = self.current_step;
        let target = current.next().ok_or(WizardError::AtBoundary {
            step: current,
            direction: "after",
        })?;
        self.move_to(target)
    }

    /// Move back one step if the current step validates.
    pub fn prev_step(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_open()?;
        let current = self.current_step;
        let target = current.prev().ok_or(WizardError::AtBoundary {
            step: current,
            direction: "before",
        })?;
        self.move_to(target)
    }

    /// Replace the brand details. Only on the brand-info step.
    pub fn update_brand(&mut self, brand: BrandEntity) -> Result<(), WizardError> {
        self.ensure_editable("brand", WizardStep::BrandInfo)?;
        self.brand = brand;
        self.touch();
        Ok(())
    }

    /// Add an item, or replace the item with the same id in place.
    pub fn upsert_item(&mut self, item: WizardItem) -> Result<(), WizardError> {
        let kind = item.kind();
        self.ensure_editable(&kind.to_string(), kind.owner_step())?;
        item.validate()?;

        match item {
            WizardItem::Product(p) => upsert_by_id(&mut self.products, p, |x| &x.id),
            WizardItem::Topic(t) => upsert_by_id(&mut self.topics, t, |x| &x.id),
            WizardItem::Persona(p) => upsert_by_id(&mut self.personas, p, |x| &x.id),
            WizardItem::Question(q) => upsert_by_id(&mut self.questions, q, |x| &x.id),
        }
        self.touch();
        Ok(())
    }

    /// Remove an item by kind and id.
    pub fn remove_item(&mut self, kind: ItemKind, id: &str) -> Result<(), WizardError> {
        self.ensure_editable(&kind.to_string(), kind.owner_step())?;

        let removed = match kind {
            ItemKind::Product => remove_by_id(&mut self.products, id, |x| &x.id),
            ItemKind::Topic => remove_by_id(&mut self.topics, id, |x| &x.id),
            ItemKind::Persona => remove_by_id(&mut self.personas, id, |x| &x.id),
            ItemKind::Question => remove_by_id(&mut self.questions, id, |x| &x.id),
        };
        if !removed {
            return Err(WizardError::ItemNotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            });
        }
        self.touch();
        Ok(())
    }

    /// Finish the wizard from the review step.
    ///
    /// Every upstream step is re-checked; the first failing step blocks
    /// submission with its notification.
    pub fn submit(&mut self) -> Result<Notification, WizardError> {
        self.ensure_open()?;
        if !self.current_step.is_terminal() {
            return Err(WizardError::NotOnReview {
                current: self.current_step,
            });
        }
        for step in WizardStep::ALL {
            if let Err(notification) = self.validate(step) {
                return Err(WizardError::Blocked { step, notification });
            }
        }

        self.submitted = true;
        self.touch();
        Ok(Notification::success("Brand setup complete").with_description(format!(
            "{} is ready: {} products, {} topics, {} personas, {} questions.",
            self.brand.name,
            self.products.len(),
            self.topics.len(),
            self.personas.len(),
            self.questions.len()
        )))
    }

    fn move_to(&mut self, target: WizardStep) -> Result<WizardStep, WizardError> {
        let current = self.current_step;
        self.validate(current)
            .map_err(|notification| WizardError::Blocked {
                step: current,
                notification,
            })?;
        self.current_step = target;
        self.touch();
        Ok(target)
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        Ok(())
    }

    fn ensure_editable(&self, kind: &str, owner: WizardStep) -> Result<(), WizardError> {
        self.ensure_open()?;
        if self.current_step != owner {
            return Err(WizardError::WrongStep {
                kind: kind.to_string(),
                owner,
                current: self.current_step,
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn require_any<T>(items: &[T], what: &str) -> Result<(), Notification> {
    if items.is_empty() {
        Err(Notification::error(format!("No {what} selected"))
            .with_description(format!("Select at least one of your {what} to continue.")))
    } else {
        Ok(())
    }
}

fn upsert_by_id<T>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> &String) {
    match items.iter().position(|x| id(x) == id(&item)) {
        Some(pos) => items[pos] = item,
        None => items.push(item),
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, target: &str, id: impl Fn(&T) -> &String) -> bool {
    let before = items.len();
    items.retain(|x| id(x) != target);
    items.len() != before
}
