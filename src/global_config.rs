//! Global configuration documents
//!
//! Search, listing, product-suggest and recommendation configurations are
//! edited as raw JSON. Fetching falls back to a default template when a kind
//! has never been configured, and a few query settings can be copied from
//! one kind to another.

use crate::api::{constants, ApiError, CoveoClient};
use clap::ValueEnum;
use serde_json::{json, Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKind {
    /// Global search configuration
    Search,
    /// Global listing configuration
    Listing,
    /// Product suggest configuration
    ProductSuggest,
    /// Global recommendation slot query configuration
    Recommendation,
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Search => "search",
            Self::Listing => "listing",
            Self::ProductSuggest => "product-suggest",
            Self::Recommendation => "recommendation",
        };
        f.write_str(name)
    }
}

impl ConfigKind {
    fn endpoint(&self, client: &CoveoClient) -> String {
        let settings = client.settings();
        let (platform, org) = (&settings.platform_url, &settings.organization_id);
        match self {
            Self::Search => constants::search_config_endpoint(platform, org),
            Self::Listing => constants::listing_config_endpoint(platform, org),
            Self::ProductSuggest => constants::product_suggest_config_endpoint(platform, org),
            Self::Recommendation => constants::recommendation_config_endpoint(platform, org),
        }
    }

    /// Whether PUT must carry the tracking id as a query parameter
    fn put_needs_tracking_id(&self) -> bool {
        matches!(self, Self::ProductSuggest | Self::Recommendation)
    }

    /// Sort settings only exist on search and listing configurations
    pub fn supports_sorts(&self) -> bool {
        matches!(self, Self::Search | Self::Listing)
    }
}

/// A fetched document and whether it is a default template
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedConfig {
    pub data: Value,
    /// Set when the server had nothing and a template was substituted
    pub notice: Option<String>,
}

/// Fetch a configuration, substituting a template where the kind allows it
pub async fn fetch_config(client: &CoveoClient, kind: ConfigKind) -> Result<FetchedConfig, ApiError> {
    let url = kind.endpoint(client);
    match kind {
        ConfigKind::Search => {
            let data = client.get_document(&url, true).await?;
            if data.get("id").is_some_and(Value::is_null) {
                return Ok(FetchedConfig {
                    data: with_search_template(data),
                    notice: Some("Global Search not yet configured. Loaded default template.".into()),
                });
            }
            Ok(FetchedConfig { data, notice: None })
        }
        ConfigKind::Listing => Ok(FetchedConfig {
            data: client.get_document(&url, true).await?,
            notice: None,
        }),
        ConfigKind::ProductSuggest => match client.get_document(&url, true).await {
            Ok(data) => Ok(FetchedConfig { data, notice: None }),
            Err(e) if e.is_not_found() => {
                log::info!("Product suggest configuration not found: {}", e);
                Ok(FetchedConfig {
                    data: json!({
                        "trackingId": client.tracking_id(),
                        "queryConfiguration": { "additionalFields": [], "perPage": 10 }
                    }),
                    notice: Some("Configuration not found. Loaded default template.".into()),
                })
            }
            Err(e) => Err(e),
        },
        ConfigKind::Recommendation => match client.get_document(&url, true).await {
            Ok(data) => Ok(FetchedConfig { data, notice: None }),
            Err(e) => {
                log::warn!("Could not fetch recommendation configuration: {}", e);
                Ok(FetchedConfig {
                    data: json!({ "additionalFields": [], "perPage": 5 }),
                    notice: Some(
                        "Global Recommendation config could not be fetched. Loaded default template."
                            .into(),
                    ),
                })
            }
        },
    }
}

fn with_search_template(data: Value) -> Value {
    let mut object = match data {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    object.insert(
        "queryConfiguration".into(),
        json!({ "perPage": 24, "additionalFields": [], "sorts": [] }),
    );
    object.insert(
        "rules".into(),
        json!({ "rankingRules": [], "filterRules": [], "pinRules": [] }),
    );
    Value::Object(object)
}

/// Save a configuration document
///
/// Product suggest falls back to creating the document when the update fails.
pub async fn save_config(
    client: &CoveoClient,
    kind: ConfigKind,
    data: &Value,
) -> Result<Value, ApiError> {
    if !data.is_object() {
        return Err(ApiError::Decode(
            "configuration must be a JSON object".to_string(),
        ));
    }

    let url = kind.endpoint(client);
    match client.put_document(&url, data, kind.put_needs_tracking_id()).await {
        Ok(saved) => Ok(saved),
        Err(e) if kind == ConfigKind::ProductSuggest => {
            log::warn!("Product suggest update failed, attempting creation: {}", e);
            client.post_document(&url, data).await
        }
        Err(e) => Err(e),
    }
}

/// Query settings that can be copied between configuration kinds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedSettings {
    pub per_page: Option<Value>,
    pub additional_fields: Vec<Value>,
    pub sorts: Option<Value>,
}

/// The object holding query settings: `queryConfiguration` when present, else the root
fn query_settings(data: &Value) -> Option<&Map<String, Value>> {
    data.get("queryConfiguration")
        .and_then(Value::as_object)
        .or_else(|| data.as_object())
}

fn query_settings_mut(data: &mut Value) -> Option<&mut Map<String, Value>> {
    if data.get("queryConfiguration").is_some_and(Value::is_object) {
        data.get_mut("queryConfiguration").and_then(Value::as_object_mut)
    } else {
        data.as_object_mut()
    }
}

pub fn extract_shared_settings(data: &Value) -> SharedSettings {
    let Some(settings) = query_settings(data) else {
        return SharedSettings::default();
    };
    SharedSettings {
        per_page: settings.get("perPage").filter(|v| !v.is_null()).cloned(),
        additional_fields: settings
            .get("additionalFields")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        sorts: settings.get("sorts").filter(|v| !v.is_null()).cloned(),
    }
}

/// Apply copied settings; sorts are skipped for kinds without sort support
pub fn apply_shared_settings(data: &mut Value, settings: &SharedSettings, kind: ConfigKind) {
    let Some(target) = query_settings_mut(data) else {
        return;
    };
    if let Some(per_page) = &settings.per_page {
        target.insert("perPage".into(), per_page.clone());
    }
    target.insert(
        "additionalFields".into(),
        Value::Array(settings.additional_fields.clone()),
    );
    if kind.supports_sorts() {
        if let Some(sorts) = &settings.sorts {
            target.insert("sorts".into(), sorts.clone());
        }
    }
}

/// Append a field to `additionalFields`; false when already listed
pub fn add_additional_field(data: &mut Value, field: &str) -> bool {
    let Some(settings) = query_settings_mut(data) else {
        return false;
    };
    let fields = settings
        .entry("additionalFields")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !fields.is_array() {
        *fields = Value::Array(Vec::new());
    }
    let Some(list) = fields.as_array_mut() else {
        return false;
    };
    if list.iter().any(|v| v.as_str() == Some(field)) {
        return false;
    }
    list.push(Value::String(field.to_string()));
    true
}

/// Remove a field from `additionalFields`; false when it was not listed
pub fn remove_additional_field(data: &mut Value, field: &str) -> bool {
    let Some(list) = query_settings_mut(data)
        .and_then(|settings| settings.get_mut("additionalFields"))
        .and_then(Value::as_array_mut)
    else {
        return false;
    };
    let before = list.len();
    list.retain(|v| v.as_str() != Some(field));
    list.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_template_keeps_existing_keys() {
        let data = with_search_template(json!({ "id": null, "trackingId": "store" }));
        assert_eq!(data["trackingId"], "store");
        assert_eq!(data["queryConfiguration"]["perPage"], 24);
        assert_eq!(data["rules"]["pinRules"], json!([]));
    }

    #[test]
    fn test_shared_settings_read_nested_or_root() {
        let nested = json!({
            "queryConfiguration": { "perPage": 24, "additionalFields": ["ec_brand"], "sorts": [{"sortCriteria": "relevance"}] }
        });
        let root = json!({ "perPage": 5, "additionalFields": [] });

        let from_nested = extract_shared_settings(&nested);
        assert_eq!(from_nested.per_page, Some(json!(24)));
        assert_eq!(from_nested.additional_fields, vec![json!("ec_brand")]);
        assert!(from_nested.sorts.is_some());

        let from_root = extract_shared_settings(&root);
        assert_eq!(from_root.per_page, Some(json!(5)));
        assert_eq!(from_root.sorts, None);
    }

    #[test]
    fn test_sorts_not_pasted_into_recommendation() {
        let settings = SharedSettings {
            per_page: Some(json!(12)),
            additional_fields: vec![json!("ec_color")],
            sorts: Some(json!([{ "sortCriteria": "relevance" }])),
        };

        let mut recommendation = json!({ "perPage": 5, "additionalFields": [] });
        apply_shared_settings(&mut recommendation, &settings, ConfigKind::Recommendation);
        assert_eq!(recommendation, json!({ "perPage": 12, "additionalFields": ["ec_color"] }));

        let mut listing = json!({ "queryConfiguration": { "perPage": 24 }, "id": "x" });
        apply_shared_settings(&mut listing, &settings, ConfigKind::Listing);
        assert_eq!(listing["queryConfiguration"]["sorts"][0]["sortCriteria"], "relevance");
        assert_eq!(listing["id"], "x");
    }

    #[test]
    fn test_additional_fields_have_no_duplicates() {
        let mut data = json!({ "queryConfiguration": {} });
        assert!(add_additional_field(&mut data, "ec_brand"));
        assert!(!add_additional_field(&mut data, "ec_brand"));
        assert!(add_additional_field(&mut data, "ec_color"));
        assert_eq!(data["queryConfiguration"]["additionalFields"], json!(["ec_brand", "ec_color"]));

        assert!(remove_additional_field(&mut data, "ec_brand"));
        assert!(!remove_additional_field(&mut data, "ec_brand"));
        assert_eq!(data["queryConfiguration"]["additionalFields"], json!(["ec_color"]));
    }

    #[test]
    fn test_kind_display_matches_cli_names() {
        assert_eq!(ConfigKind::ProductSuggest.to_string(), "product-suggest");
        assert!(!ConfigKind::ProductSuggest.supports_sorts());
        assert!(ConfigKind::Search.supports_sorts());
    }
}
