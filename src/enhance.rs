//! AI-suggested filter rules
//!
//! Asks Gemini for one `{field, operator, value}` rule that would populate a
//! listing page with the given name. A failed or empty answer is simply "no
//! suggestion".

use crate::api::{
    ApiError, ApiRequest, Filter, FilterValue, ListingPage, Transport, DEFAULT_OPERATOR,
};
use crate::listings::add_rule;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// A single suggested filter rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub value: String,
}

impl Suggestion {
    fn is_usable(&self) -> bool {
        !self.field.trim().is_empty() && !self.value.trim().is_empty()
    }
}

pub struct GeminiEnhancer {
    api_key: String,
    model: String,
    endpoint: String,
    transport: Arc<dyn Transport>,
}

impl GeminiEnhancer {
    pub fn new(api_key: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            endpoint: GEMINI_ENDPOINT.to_string(),
            transport,
        }
    }

    /// Build from `GEMINI_API_KEY`, if set
    pub fn from_env(transport: Arc<dyn Transport>) -> Option<Self> {
        std::env::var(GEMINI_API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Self::new(key, transport))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_body(listing_name: &str) -> Value {
        let prompt = format!(
            "Given the e-commerce listing page name \"{}\", suggest a single likely filter rule to populate this page.\n\
             Standard fields are often 'ec_brand', 'ec_category', 'ec_price', 'ec_color'.\n\
             Operators: 'isExactly', 'contains'.\n\
             Return JSON only.",
            listing_name
        );

        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "field": { "type": "STRING", "description": "The field to filter on, e.g. ec_category" },
                        "operator": { "type": "STRING", "description": "The operator, e.g. contains or isExactly" },
                        "value": { "type": "STRING", "description": "The value to filter by" }
                    }
                }
            }
        })
    }

    /// Ask for a suggestion; any failure is logged and yields `None`
    pub async fn suggest(&self, listing_name: &str) -> Option<Suggestion> {
        match self.try_suggest(listing_name).await {
            Ok(Some(suggestion)) if suggestion.is_usable() => Some(suggestion),
            Ok(_) => {
                log::info!("No usable AI suggestion for '{}'", listing_name);
                None
            }
            Err(e) => {
                log::warn!("AI enhancement failed for '{}': {:#}", listing_name, e);
                None
            }
        }
    }

    async fn try_suggest(&self, listing_name: &str) -> Result<Option<Suggestion>> {
        let url = format!("{}/{}:generateContent", self.endpoint, self.model);
        let request = ApiRequest::post(url)
            .header("x-goog-api-key", self.api_key.clone())
            .json(Self::request_body(listing_name));

        let response = self
            .transport
            .send(request)
            .await?
            .error_for_status()?;
        let body = response.json()?;

        let Some(text) = body
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
        else {
            return Ok(None);
        };

        let suggestion: Suggestion = serde_json::from_str(text)
            .map_err(ApiError::from)
            .context("Model answer was not the requested JSON shape")?;
        Ok(Some(suggestion))
    }
}

/// Add the suggestion to a listing as a string-typed rule
///
/// The rule is named `AI Suggested: {field}` (with a counter on collision).
/// Returns false when the page already has an equivalent rule.
pub fn apply_suggestion(listing: &mut ListingPage, suggestion: &Suggestion) -> bool {
    let field = suggestion.field.trim().to_lowercase();
    let operator = match suggestion.operator.trim() {
        "" => DEFAULT_OPERATOR.to_string(),
        op => op.to_string(),
    };
    let base_name = format!("AI Suggested: {}", field);
    let filter = Filter {
        field_name: field,
        operator,
        value: FilterValue::String {
            value: suggestion.value.trim().to_string(),
        },
    };
    add_rule(listing, filter, None, &base_name)
}
