//! Five-step brand setup wizard: brand info, topics, personas, questions,
//! review.

pub mod manager;
pub mod model;
pub mod routes;
pub mod state;
pub mod suggestions;

pub use manager::WizardManager;
pub use model::{
    BrandEntity, Demographics, ItemKind, ModelResponse, Persona, Product, Question, Sentiment,
    SocialLink, Topic, WizardItem,
};
pub use routes::wizard_routes;
pub use state::{StepSummary, WizardState, WizardStep};
pub use suggestions::suggestions_for;
