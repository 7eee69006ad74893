//! Search over the mock question set, result reports and the prompt sandbox.

pub mod mock_data;
pub mod routes;

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;

use crate::error::SearchError;
use crate::wizard::{ModelResponse, Question, Sentiment};

use mock_data::{MOCK_MODELS, SANDBOX_TEMPLATES};

pub use routes::search_routes;

/// Query plus optional response filters.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub query: String,
    /// Exact model name, compared case-insensitively.
    pub model: Option<String>,
    pub sentiment: Option<Sentiment>,
}

impl SearchFilters {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.trim().to_string(),
            ..Self::default()
        }
    }

    fn has_response_filter(&self) -> bool {
        self.model.is_some() || self.sentiment.is_some()
    }

    fn keeps(&self, r: &ModelResponse) -> bool {
        let model_ok = self
            .model
            .as_deref()
            .is_none_or(|m| r.model.eq_ignore_ascii_case(m));
        let sentiment_ok = self.sentiment.is_none_or(|s| r.sentiment == Some(s));
        model_ok && sentiment_ok
    }
}

/// Questions whose text or any response text contains the query
/// (case-insensitive). Responses are narrowed by the model and sentiment
/// filters; a question left with no responses under a filter is dropped.
pub fn search(questions: &[Question], filters: &SearchFilters) -> Vec<Question> {
    let needle = filters.query.to_lowercase();
    questions
        .iter()
        .filter(|q| {
            needle.is_empty()
                || q.text.to_lowercase().contains(&needle)
                || q
                    .responses
                    .iter()
                    .any(|r| r.response.to_lowercase().contains(&needle))
        })
        .filter_map(|q| {
            let mut q = q.clone();
            q.responses.retain(|r| filters.keeps(r));
            (!filters.has_response_filter() || !q.responses.is_empty()).then_some(q)
        })
        .collect()
}

/// Counts over a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchReport {
    pub total_questions: usize,
    pub total_responses: usize,
    pub by_sentiment: BTreeMap<String, usize>,
    pub by_model: BTreeMap<String, usize>,
    pub hallucinations: usize,
}

pub fn summarize(results: &[Question]) -> SearchReport {
    let mut report = SearchReport {
        total_questions: results.len(),
        ..SearchReport::default()
    };
    for r in results.iter().flat_map(|q| &q.responses) {
        report.total_responses += 1;
        *report.by_model.entry(r.model.clone()).or_default() += 1;
        if let Some(sentiment) = r.sentiment {
            *report.by_sentiment.entry(sentiment.to_string()).or_default() += 1;
        }
        if r.hallucination == Some(true) {
            report.hallucinations += 1;
        }
    }
    report
}

/// One canned answer per requested model with `brand` and `prompt` filled in.
/// An empty model list means every mock model.
pub fn sandbox(
    prompt: &str,
    brand: &str,
    models: &[String],
) -> Result<Vec<ModelResponse>, SearchError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(SearchError::EmptyPrompt);
    }
    let brand = match brand.trim() {
        "" => "your brand",
        b => b,
    };

    let wanted: Vec<&str> = if models.is_empty() {
        MOCK_MODELS.to_vec()
    } else {
        models
            .iter()
            .map(|m| {
                MOCK_MODELS
                    .iter()
                    .find(|known| known.eq_ignore_ascii_case(m.trim()))
                    .copied()
                    .ok_or_else(|| SearchError::UnknownModel(m.clone()))
            })
            .collect::<Result<_, _>>()?
    };

    let now = Utc::now();
    Ok(SANDBOX_TEMPLATES
        .iter()
        .filter(|(model, _, _)| wanted.contains(model))
        .map(|(model, template, sentiment)| ModelResponse {
            model: (*model).to_string(),
            response: template.replace("{brand}", brand).replace("{prompt}", prompt),
            timestamp: now,
            sentiment: Some(*sentiment),
            topics: Vec::new(),
            hallucination: Some(false),
        })
        .collect())
}
