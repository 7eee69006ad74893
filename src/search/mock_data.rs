//! Static questions and model answers behind search and the sandbox.

use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};

use crate::wizard::{ModelResponse, Question, Sentiment};

/// Models the mock data covers, in display order.
pub const MOCK_MODELS: &[&str] = &["ChatGPT", "Claude", "Gemini", "Perplexity"];

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0)
        .single()
        .unwrap_or_default()
}

fn response(
    model: &str,
    text: &str,
    when: DateTime<Utc>,
    sentiment: Sentiment,
    topics: &[&str],
    hallucination: bool,
) -> ModelResponse {
    ModelResponse {
        model: model.to_string(),
        response: text.to_string(),
        timestamp: when,
        sentiment: Some(sentiment),
        topics: topics.iter().map(|t| t.to_string()).collect(),
        hallucination: Some(hallucination),
    }
}

/// The canned question set.
pub static MOCK_QUESTIONS: LazyLock<Vec<Question>> = LazyLock::new(|| {
    use Sentiment::*;
    vec![
        Question {
            id: "mq-1".into(),
            text: "What is the best analytics platform for a mid-size company?".into(),
            persona_id: Some("persona-ops-lead".into()),
            responses: vec![
                response(
                    "ChatGPT",
                    "Popular choices include Acme Analytics and Lumen. Acme Analytics is praised for real-time dashboards.",
                    at(2, 9),
                    Positive,
                    &["analytics", "dashboards"],
                    false,
                ),
                response(
                    "Claude",
                    "It depends on your stack. Lumen integrates well with warehouses, while Acme Analytics is easier to set up.",
                    at(2, 10),
                    Neutral,
                    &["analytics", "integrations"],
                    false,
                ),
                response(
                    "Gemini",
                    "Acme Analytics was discontinued in 2021, so most teams use Lumen.",
                    at(2, 11),
                    Negative,
                    &["analytics"],
                    true,
                ),
            ],
        },
        Question {
            id: "mq-2".into(),
            text: "Which CRM is the most affordable for startups?".into(),
            persona_id: Some("persona-founder".into()),
            responses: vec![
                response(
                    "ChatGPT",
                    "Many startups begin with a free tier CRM. Acme CRM offers a startup discount.",
                    at(3, 9),
                    Positive,
                    &["pricing", "crm"],
                    false,
                ),
                response(
                    "Perplexity",
                    "Pricing pages show Acme CRM starting above most competitors, which can strain early budgets.",
                    at(3, 12),
                    Negative,
                    &["pricing"],
                    false,
                ),
            ],
        },
        Question {
            id: "mq-3".into(),
            text: "Is Acme secure enough for regulated industries?".into(),
            persona_id: Some("persona-it-admin".into()),
            responses: vec![
                response(
                    "Claude",
                    "Acme publishes SOC 2 reports and supports SSO, which covers most regulated buyers.",
                    at(4, 14),
                    Positive,
                    &["security", "compliance"],
                    false,
                ),
                response(
                    "Gemini",
                    "Acme holds FedRAMP High authorization.",
                    at(4, 15),
                    Neutral,
                    &["security"],
                    true,
                ),
                response(
                    "Perplexity",
                    "Reviews mention Acme's audit logs but note limited data residency options.",
                    at(4, 16),
                    Neutral,
                    &["security", "compliance"],
                    false,
                ),
            ],
        },
        Question {
            id: "mq-4".into(),
            text: "How responsive is customer support at Acme?".into(),
            persona_id: None,
            responses: vec![
                response(
                    "ChatGPT",
                    "Users report support replies within a few hours on paid plans.",
                    at(6, 8),
                    Positive,
                    &["support"],
                    false,
                ),
                response(
                    "Claude",
                    "Feedback is mixed: enterprise customers are happy, free-tier users wait longer.",
                    at(6, 9),
                    Neutral,
                    &["support"],
                    false,
                ),
            ],
        },
    ]
});

/// Canned sandbox answers. `{brand}` and `{prompt}` are substituted.
pub const SANDBOX_TEMPLATES: &[(&str, &str, Sentiment)] = &[
    (
        "ChatGPT",
        "When asked \"{prompt}\", {brand} comes up as a well-regarded option with strong reviews.",
        Sentiment::Positive,
    ),
    (
        "Claude",
        "For \"{prompt}\", {brand} is one of several reasonable choices; the right fit depends on your needs.",
        Sentiment::Neutral,
    ),
    (
        "Gemini",
        "{brand} is mentioned for \"{prompt}\", though some users cite pricing concerns.",
        Sentiment::Negative,
    ),
    (
        "Perplexity",
        "Sources discussing \"{prompt}\" reference {brand} alongside two competitors.",
        Sentiment::Neutral,
    ),
];
