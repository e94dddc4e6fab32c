//! Wire models for the Commerce listing-page API
//!
//! Request and response shapes for `commerce/v2/listings/pages`. Field names
//! are camelCase on the wire.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;

/// Default filter operator when a row or suggestion does not name one
pub const DEFAULT_OPERATOR: &str = "isExactly";

/// A URL pattern matched against the storefront page URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlPattern {
    pub url: String,
}

impl UrlPattern {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Locale a page rule is restricted to
///
/// Empty strings are normalised to `None`; a locale with no component set is
/// treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl Locale {
    /// Build a locale from raw cell values, returning `None` when all are blank
    pub fn from_parts(
        language: Option<&str>,
        country: Option<&str>,
        currency: Option<&str>,
    ) -> Option<Self> {
        let locale = Self {
            language: non_empty(language),
            country: non_empty(country),
            currency: non_empty(currency),
        };
        if locale.is_empty() { None } else { Some(locale) }
    }

    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.country.is_none() && self.currency.is_none()
    }

    /// Present components joined with `-`, e.g. `en-US-USD`
    pub fn label(&self) -> String {
        [&self.language, &self.country, &self.currency]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Typed filter value, tagged by `type` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterValue {
    String { value: String },
    Decimal { value: Number },
    Array { values: Vec<String> },
    /// Any value type this client does not model; carried through as empty
    #[serde(other)]
    Unknown,
}

impl FilterValue {
    /// Single value stays string-typed, several values become array-typed
    pub fn from_values(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            Self::String {
                value: values.remove(0),
            }
        } else {
            Self::Array { values }
        }
    }

    /// Flatten back to a single cell; arrays are joined with `;`
    pub fn render(&self) -> String {
        match self {
            Self::String { value } => value.clone(),
            Self::Decimal { value } => value.to_string(),
            Self::Array { values } => values.join(";"),
            Self::Unknown => String::new(),
        }
    }

    /// Equality used for rule deduplication: arrays compare as sets of equal size
    pub fn same_values(&self, other: &FilterValue) -> bool {
        match (self, other) {
            (Self::Array { values: a }, Self::Array { values: b }) => {
                a.len() == b.len() && b.iter().all(|v| a.contains(v))
            }
            (a, b) => a == b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub field_name: String,
    pub operator: String,
    pub value: FilterValue,
}

/// A named rule narrowing the catalog shown on a listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRule {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locales: Option<Vec<Locale>>,
}

impl PageRule {
    /// First non-empty locale, if any
    pub fn locale(&self) -> Option<&Locale> {
        self.locales
            .as_ref()
            .and_then(|locales| locales.first())
            .filter(|locale| !locale.is_empty())
    }

    /// True when both rules carry one identical filter and the same locale (or none)
    pub fn is_equivalent(&self, filter: &Filter, locale: Option<&Locale>) -> bool {
        let [existing] = self.filters.as_slice() else {
            return false;
        };
        existing.field_name == filter.field_name
            && existing.operator == filter.operator
            && existing.value.same_values(&filter.value)
            && self.locale() == locale
    }
}

/// Listing page as sent to bulk-create / bulk-update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub tracking_id: String,
    #[serde(default)]
    pub patterns: Vec<UrlPattern>,
    #[serde(default)]
    pub page_rules: Vec<PageRule>,
}

impl ListingPage {
    pub fn new(name: impl Into<String>, tracking_id: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            tracking_id: tracking_id.into(),
            patterns: Vec::new(),
            page_rules: Vec::new(),
        }
    }

    /// Append a pattern unless the exact URL is already present
    pub fn add_pattern(&mut self, url: &str) -> bool {
        if self.patterns.iter().any(|p| p.url == url) {
            return false;
        }
        self.patterns.push(UrlPattern::new(url));
        true
    }

    pub fn has_rule_named(&self, name: &str) -> bool {
        self.page_rules.iter().any(|r| r.name == name)
    }

    pub fn has_equivalent_rule(&self, filter: &Filter, locale: Option<&Locale>) -> bool {
        self.page_rules
            .iter()
            .any(|rule| rule.is_equivalent(filter, locale))
    }
}

/// Listing page as returned by the list and detail endpoints
///
/// `page_rules` is the current inline shape; older listings only expose
/// `filter_rules` through the per-listing detail endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPageResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub patterns: Vec<Option<UrlPattern>>,
    #[serde(default)]
    pub page_rules: Option<Vec<PageRule>>,
    #[serde(default)]
    pub filter_rules: Option<Vec<PageRule>>,
}

impl ListingPageResponse {
    /// Rules in whichever shape is populated, preferring `pageRules`
    pub fn rules(&self) -> &[PageRule] {
        match (&self.page_rules, &self.filter_rules) {
            (Some(rules), _) if !rules.is_empty() => rules,
            (_, Some(rules)) => rules,
            _ => &[],
        }
    }

    /// Neither rule shape was included in the payload
    pub fn needs_detail(&self) -> bool {
        self.rules().is_empty()
    }

    /// Non-null pattern URLs joined with `;`
    pub fn joined_patterns(&self) -> String {
        self.patterns
            .iter()
            .flatten()
            .map(|p| p.url.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// One page of `GET listings/pages`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPageList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<ListingPageResponse>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_entries: Option<u32>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_value_wire_shape() {
        let single = FilterValue::from_values(vec!["Summer".to_string()]);
        assert_eq!(
            serde_json::to_value(&single).unwrap(),
            json!({"type": "string", "value": "Summer"})
        );

        let many = FilterValue::from_values(vec!["red".into(), "blue".into()]);
        assert_eq!(
            serde_json::to_value(&many).unwrap(),
            json!({"type": "array", "values": ["red", "blue"]})
        );

        let decimal: FilterValue =
            serde_json::from_value(json!({"type": "decimal", "value": 19.99})).unwrap();
        assert_eq!(decimal.render(), "19.99");
    }

    #[test]
    fn test_unknown_value_type_still_parses() {
        let rule: PageRule = serde_json::from_value(json!({
            "name": "Range",
            "filters": [{"fieldName": "ec_price", "operator": "between", "value": {"type": "range", "min": 1, "max": 5}}]
        }))
        .unwrap();
        assert_eq!(rule.filters[0].value, FilterValue::Unknown);
        assert_eq!(rule.filters[0].value.render(), "");
    }

    #[test]
    fn test_list_page_without_totals() {
        let list: ListingPageList =
            serde_json::from_value(json!({"items": [{"id": "1", "name": "A"}]})).unwrap();
        assert_eq!(list.total_pages, None);
        assert_eq!(list.items.len(), 1);
    }

    #[test]
    fn test_array_values_compare_as_sets() {
        let a = FilterValue::Array {
            values: vec!["red".into(), "blue".into()],
        };
        let b = FilterValue::Array {
            values: vec!["blue".into(), "red".into()],
        };
        let c = FilterValue::String {
            value: "red".into(),
        };
        assert!(a.same_values(&b));
        assert!(!a.same_values(&c));
    }

    #[test]
    fn test_locale_from_blank_parts_is_absent() {
        assert_eq!(Locale::from_parts(Some(""), None, Some("  ")), None);
        let locale = Locale::from_parts(Some("en"), None, Some("USD")).unwrap();
        assert_eq!(locale.label(), "en-USD");
    }

    #[test]
    fn test_listing_response_tolerates_nulls() {
        let listing: ListingPageResponse = serde_json::from_value(json!({
            "id": "abc",
            "name": "Shoes",
            "patterns": [{"url": "https://a.com/shoes"}, null, {"url": "https://b.com/shoes"}],
            "pageRules": null
        }))
        .unwrap();
        assert_eq!(listing.joined_patterns(), "https://a.com/shoes;https://b.com/shoes");
        assert!(listing.needs_detail());
    }

    #[test]
    fn test_request_serialization_omits_absent_fields() {
        let mut page = ListingPage::new("Shoes", "store");
        page.add_pattern("https://a.com/shoes");
        assert!(!page.add_pattern("https://a.com/shoes"));
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Shoes",
                "trackingId": "store",
                "patterns": [{"url": "https://a.com/shoes"}],
                "pageRules": []
            })
        );
    }
}
