//! Canned suggestions used to prefill each wizard step.

use super::model::{Demographics, Persona, Product, Question, Topic, WizardItem};
use super::state::WizardStep;

const PRODUCTS: &[(&str, &str, &str, &[&str])] = &[
    (
        "prod-analytics",
        "Analytics Platform",
        "Software",
        &["Real-time dashboards", "No-code reports"],
    ),
    (
        "prod-crm",
        "CRM Suite",
        "Software",
        &["Unified customer view", "Pipeline automation"],
    ),
    (
        "prod-support",
        "Support Desk",
        "Customer service",
        &["Shared inbox", "SLA tracking"],
    ),
];

const TOPICS: &[(&str, &str, &str)] = &[
    ("topic-pricing", "Pricing", "How the brand's prices compare to competitors"),
    ("topic-integrations", "Integrations", "Which tools the brand connects with"),
    ("topic-support", "Customer support", "Quality and speed of support"),
    ("topic-security", "Security", "Compliance and data protection"),
];

/// Suggestions for the given step. `brand` is substituted into question text
/// when given. Review has nothing to suggest.
pub fn suggestions_for(step: WizardStep, brand: Option<&str>) -> Vec<WizardItem> {
    match step {
        WizardStep::BrandInfo => PRODUCTS
            .iter()
            .map(|(id, name, category, props)| {
                WizardItem::Product(Product {
                    id: (*id).into(),
                    name: (*name).into(),
                    category: (*category).into(),
                    value_propositions: props.iter().map(|p| (*p).to_string()).collect(),
                })
            })
            .collect(),
        WizardStep::Topics => TOPICS
            .iter()
            .map(|(id, name, description)| {
                WizardItem::Topic(Topic {
                    id: (*id).into(),
                    name: (*name).into(),
                    description: Some((*description).into()),
                    related_product_ids: Vec::new(),
                })
            })
            .collect(),
        WizardStep::Personas => personas().into_iter().map(WizardItem::Persona).collect(),
        WizardStep::Questions => questions(brand.unwrap_or("your brand"))
            .into_iter()
            .map(WizardItem::Question)
            .collect(),
        WizardStep::Review => Vec::new(),
    }
}

fn personas() -> Vec<Persona> {
    vec![
        Persona {
            id: "persona-ops-lead".into(),
            name: "Operations lead".into(),
            description: "Runs day-to-day operations at a mid-size company".into(),
            pain_points: vec!["Manual reporting".into(), "Tool sprawl".into()],
            motivators: vec!["Saving time".into()],
            demographics: Some(Demographics {
                age_range: Some("30-45".into()),
                gender: None,
                location: Some("North America".into()),
                goals: vec!["Streamline workflows".into()],
            }),
            topic_ids: vec!["topic-integrations".into()],
            product_ids: vec!["prod-analytics".into()],
        },
        Persona {
            id: "persona-founder".into(),
            name: "Startup founder".into(),
            description: "Early-stage founder choosing a first stack".into(),
            pain_points: vec!["Tight budget".into()],
            motivators: vec!["Growth".into(), "Low upfront cost".into()],
            demographics: None,
            topic_ids: vec!["topic-pricing".into()],
            product_ids: vec!["prod-crm".into()],
        },
        Persona {
            id: "persona-it-admin".into(),
            name: "IT administrator".into(),
            description: "Owns vendor reviews and access control".into(),
            pain_points: vec!["Compliance audits".into()],
            motivators: vec!["Reliability".into()],
            demographics: None,
            topic_ids: vec!["topic-security".into()],
            product_ids: Vec::new(),
        },
    ]
}

fn questions(brand: &str) -> Vec<Question> {
    [
        ("q-best-tool", "What is the best analytics tool for a mid-size company?", Some("persona-ops-lead")),
        ("q-cheapest-crm", "Which CRM is the most affordable for startups?", Some("persona-founder")),
        ("q-brand-secure", "Is {brand} secure enough for regulated industries?", Some("persona-it-admin")),
        ("q-brand-alternatives", "What are the main alternatives to {brand}?", None),
    ]
    .into_iter()
    .map(|(id, text, persona)| Question {
        id: id.into(),
        text: text.replace("{brand}", brand),
        persona_id: persona.map(String::from),
        responses: Vec::new(),
    })
    .collect()
}
