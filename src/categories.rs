//! Category-driven listing generation
//!
//! Enumerates the values of a catalog field through the Search API and turns
//! the selected ones into listing pages using URL and name templates such as
//! `https://example.com/c/{{code_value | leaf}}`.

use crate::api::{ApiError, CoveoClient, Filter, FilterValue, ListingPage, DEFAULT_OPERATOR};
use crate::listings::add_rule;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Code-value lookups in flight at once
const CODE_LOOKUP_CONCURRENCY: usize = 8;

pub const DEFAULT_URL_TEMPLATE: &str = "https://example.com/c/{{code_value | leaf}}";
pub const DEFAULT_NAME_TEMPLATE: &str = "{{code_value | leaf}} - {{value | leaf}}";

static VALUE_LEAF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*value\s*\|\s*leaf\s*\}\}").expect("valid regex"));
static VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{\s*value\s*\}\}").expect("valid regex"));
static CODE_LEAF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*code_value\s*\|\s*leaf\s*\}\}").expect("valid regex"));
static CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*code_value\s*\}\}").expect("valid regex"));
static NON_SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid regex"));

/// One facet value of the category field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryValue {
    pub value: String,
    pub code_value: Option<String>,
    pub count: u64,
}

/// What to enumerate
#[derive(Debug, Clone)]
pub struct FieldValuesQuery {
    /// Category field, e.g. `@ec_category`
    pub field: String,
    /// Optional correlated code field, e.g. `@ec_category_code`
    pub code_field: Option<String>,
    /// Restrict to one catalog source
    pub catalog_id: Option<String>,
    pub max_values: u32,
}

fn catalog_filter(catalog_id: Option<&str>) -> Option<String> {
    catalog_id
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| format!("@source==\"{}\"", c))
}

/// Enumerate category values, most frequent first
///
/// When a distinct code field is given, each value's code is read from one
/// matching document. Those lookups are best-effort.
pub async fn fetch_field_values(
    client: &CoveoClient,
    query: &FieldValuesQuery,
) -> Result<Vec<CategoryValue>, ApiError> {
    let catalog_aq = catalog_filter(query.catalog_id.as_deref());
    let body = json!({
        "q": "",
        "aq": catalog_aq.clone().unwrap_or_default(),
        "numberOfResults": 0,
        "groupBy": [{
            "field": query.field,
            "sortCriteria": "occurrences",
            "maximumNumberOfValues": query.max_values,
            "completeFacetWithStandardValues": false
        }]
    });

    let response = client.search(body).await?;
    let values: Vec<CategoryValue> = response
        .pointer("/groupByResults/0/values")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|item| {
                    Some(CategoryValue {
                        value: item.get("value")?.as_str()?.to_string(),
                        code_value: None,
                        count: item
                            .get("numberOfResults")
                            .and_then(Value::as_u64)
                            .unwrap_or(0),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    log::info!("Fetched {} values for {}", values.len(), query.field);

    let code_field = match query.code_field.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() && code != query.field => code.to_string(),
        _ => return Ok(values),
    };

    let values = stream::iter(values)
        .map(|mut category| {
            let code_field = code_field.clone();
            let catalog_aq = catalog_aq.clone();
            async move {
                category.code_value =
                    lookup_code_value(client, &query.field, &code_field, catalog_aq, &category.value)
                        .await;
                category
            }
        })
        .buffered(CODE_LOOKUP_CONCURRENCY)
        .collect()
        .await;

    Ok(values)
}

async fn lookup_code_value(
    client: &CoveoClient,
    field: &str,
    code_field: &str,
    catalog_aq: Option<String>,
    value: &str,
) -> Option<String> {
    let value_aq = format!("{}==\"{}\"", field, value.replace('"', "\\\""));
    let aq = match catalog_aq {
        Some(catalog) => format!("{} AND {}", catalog, value_aq),
        None => value_aq,
    };
    let body = json!({
        "q": "",
        "aq": aq,
        "numberOfResults": 1,
        "fieldsToInclude": [code_field]
    });

    let response = match client.search(body).await {
        Ok(response) => response,
        Err(e) => {
            log::debug!("Code lookup for '{}' failed: {}", value, e);
            return None;
        }
    };

    let raw = response.pointer("/results/0/raw")?;
    let code = raw.get(code_field.trim_start_matches('@'))?;
    match code {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Last non-empty `|`-separated segment of a hierarchical value
pub fn leaf(value: &str) -> &str {
    value
        .split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .last()
        .unwrap_or(value)
}

/// URL-friendly form: lower-case, punctuation dropped, whitespace to `-`
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let cleaned = NON_SLUG.replace_all(&lowered, "");
    let dashed = WHITESPACE.replace_all(&cleaned, "-");
    DASHES.replace_all(&dashed, "-").trim().to_string()
}

/// Substitute `{{value}}`, `{{code_value}}` and their `| leaf` forms
///
/// Without a code value the code placeholders fall back to the value.
pub fn render_template(template: &str, category: &CategoryValue) -> String {
    let code = category.code_value.as_deref().unwrap_or(&category.value);

    let result = VALUE_LEAF.replace_all(template, slugify(leaf(&category.value)).as_str());
    let result = VALUE.replace_all(&result, slugify(&category.value).as_str());
    let result = CODE_LEAF.replace_all(&result, slugify(leaf(code)).as_str());
    CODE.replace_all(&result, slugify(code).as_str()).into_owned()
}

/// Page name from a template: dashes become spaces, whitespace collapsed
pub fn render_page_name(template: &str, category: &CategoryValue) -> String {
    let rendered = render_template(template, category).replace('-', " ");
    WHITESPACE.replace_all(&rendered, " ").trim().to_string()
}

/// Templates and field used to turn categories into listings
#[derive(Debug, Clone)]
pub struct GeneratorTemplates {
    pub field: String,
    pub url_template: String,
    pub name_template: String,
}

/// Build one listing per selected category
///
/// Categories rendering to the same page name share one listing.
pub fn generate_listings(
    categories: &[CategoryValue],
    templates: &GeneratorTemplates,
    tracking_id: &str,
) -> Vec<ListingPage> {
    let field_name = templates.field.trim().trim_start_matches('@').to_lowercase();
    let mut listings: Vec<ListingPage> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for category in categories {
        let name = render_page_name(&templates.name_template, category);
        if name.is_empty() {
            log::warn!("Skipping '{}': page name template rendered empty", category.value);
            continue;
        }

        let index = *index_by_name.entry(name.clone()).or_insert_with(|| {
            listings.push(ListingPage::new(name.as_str(), tracking_id));
            listings.len() - 1
        });
        let listing = &mut listings[index];

        let url = render_template(&templates.url_template, category);
        if !url.is_empty() {
            listing.add_pattern(&url);
        }

        let filter = Filter {
            field_name: field_name.clone(),
            operator: DEFAULT_OPERATOR.to_string(),
            value: FilterValue::String {
                value: category.value.clone(),
            },
        };
        let base_name = format!("Rule: {} = {}", field_name, category.value);
        add_rule(listing, filter, None, &base_name);
    }

    listings
}
