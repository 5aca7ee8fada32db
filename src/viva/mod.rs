//! Viva question generation via an external AI collaborator.
//!
//! The core depends only on the call's shape: `(title, objective)` in, an
//! array of question/answer pairs out. Every failure yields an empty result.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::models::{Contribution, ContributionType, Timestamp};

/// Attribution recorded on generated contributions.
const GENERATOR_AUTHOR: &str = "Gemini AI";

/// One generated question/answer pair.
#[derive(Debug, Clone, Deserialize)]
struct VivaPair {
    question: String,
    answer: String,
}

/// Client for a generateContent-style text generation endpoint.
pub struct VivaGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl VivaGenerator {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
        }
    }

    /// Build from config; a missing endpoint or key disables generation.
    pub fn from_config(config: &Config) -> Option<Self> {
        match (&config.ai_url, &config.ai_key) {
            (Some(endpoint), Some(api_key)) => {
                Some(Self::new(endpoint.clone(), api_key.clone()))
            }
            _ => {
                tracing::warn!(
                    "Viva generator not configured (LABLINK_AI_URL / LABLINK_AI_KEY). \
                     AI features are disabled."
                );
                None
            }
        }
    }

    /// Generate viva contributions for an experiment.
    pub async fn generate(&self, title: &str, objective: &str) -> Vec<Contribution> {
        let body = json!({
            "contents": [{"parts": [{"text": build_prompt(title, objective)}]}],
            "generationConfig": {"responseMimeType": "application/json"}
        });

        let response = match self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Viva generation request failed: {}", e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Viva generation rejected: {}", response.status());
            return Vec::new();
        }

        let payload: serde_json::Value = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Viva generation returned an unreadable body: {}", e);
                return Vec::new();
            }
        };

        match contributions_from_response(&payload) {
            Some(contributions) => contributions,
            None => {
                tracing::warn!("Viva generation returned an unexpected payload");
                Vec::new()
            }
        }
    }
}

fn build_prompt(title: &str, objective: &str) -> String {
    format!(
        "You are an expert computer science professor. For a lab experiment titled \"{title}\" \
         with the objective \"{objective}\", generate 5 insightful viva questions that a student \
         should be prepared for. For each question, provide a concise and accurate answer. \
         Format the output as a JSON array of objects, where each object has a \"question\" and \
         \"answer\" property."
    )
}

/// Pull the generated pairs out of a generateContent-style response and wrap
/// them as viva contributions.
fn contributions_from_response(payload: &serde_json::Value) -> Option<Vec<Contribution>> {
    let text = payload["candidates"][0]["content"]["parts"][0]["text"].as_str()?;
    let pairs: Vec<VivaPair> = serde_json::from_str(text).ok()?;

    Some(
        pairs
            .into_iter()
            .map(|pair| Contribution {
                id: format!("ai-viva-{}", uuid::Uuid::new_v4()),
                author: GENERATOR_AUTHOR.to_string(),
                kind: ContributionType::Viva,
                content: pair.answer,
                image_url: None,
                language: None,
                code_snippets: None,
                question: Some(pair.question),
                upvotes: 0,
                created_at: Timestamp::now(),
                is_ai_generated: Some(true),
            })
            .collect(),
    )
}
