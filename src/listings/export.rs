//! Listing pages back to flat CSV rows
//!
//! One row per (filter × locale) of every rule; rules without filters or
//! locales still produce a row so nothing silently disappears. Array values
//! are joined with `;`, the same separator the importer splits on, so an
//! export re-imports to the same filters.

use super::csv_parser::CsvRow;
use crate::api::{ApiError, CoveoClient, ListingPage, ListingPageResponse, Locale, PageRule};
use futures::stream::{self, StreamExt};

/// Detail requests in flight at once when resolving legacy listings
pub const DETAIL_FETCH_CONCURRENCY: usize = 8;

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn rows_for_listing(name: &str, url_pattern: &str, rules: &[PageRule]) -> Vec<CsvRow> {
    let base = CsvRow {
        name: Some(name.to_string()),
        url_pattern: non_empty(url_pattern.to_string()),
        ..CsvRow::default()
    };

    if rules.is_empty() {
        return vec![base];
    }

    let mut rows = Vec::new();
    for rule in rules {
        let locales: Vec<Option<&Locale>> = match &rule.locales {
            Some(locales) if locales.iter().any(|l| !l.is_empty()) => locales
                .iter()
                .filter(|l| !l.is_empty())
                .map(Some)
                .collect(),
            _ => vec![None],
        };

        for locale in locales {
            let with_locale = CsvRow {
                language: locale.and_then(|l| l.language.clone()),
                country: locale.and_then(|l| l.country.clone()),
                currency: locale.and_then(|l| l.currency.clone()),
                ..base.clone()
            };

            if rule.filters.is_empty() {
                rows.push(with_locale);
                continue;
            }

            for filter in &rule.filters {
                rows.push(CsvRow {
                    filter_field: non_empty(filter.field_name.clone()),
                    filter_value: non_empty(filter.value.render()),
                    filter_operator: non_empty(filter.operator.clone()),
                    ..with_locale.clone()
                });
            }
        }
    }
    rows
}

/// Rows for listings as returned by the API
pub fn listings_to_rows(listings: &[ListingPageResponse]) -> Vec<CsvRow> {
    listings
        .iter()
        .flat_map(|listing| {
            rows_for_listing(&listing.name, &listing.joined_patterns(), listing.rules())
        })
        .collect()
}

/// Rows for locally built listings (e.g. generated categories)
pub fn pages_to_rows(listings: &[ListingPage]) -> Vec<CsvRow> {
    listings
        .iter()
        .flat_map(|listing| {
            let urls = listing
                .patterns
                .iter()
                .map(|p| p.url.as_str())
                .collect::<Vec<_>>()
                .join(";");
            rows_for_listing(&listing.name, &urls, &listing.page_rules)
        })
        .collect()
}

/// Fill in rules for listings whose payload carried none
///
/// Detail requests run concurrently. A failed request leaves that listing
/// as-is, so it exports as a bare row instead of failing the export.
pub async fn resolve_legacy_rules(
    client: &CoveoClient,
    listings: Vec<ListingPageResponse>,
) -> Vec<ListingPageResponse> {
    let pending = listings.iter().filter(|l| l.needs_detail()).count();
    if pending == 0 {
        return listings;
    }
    log::info!("Fetching rule details for {} listing(s)", pending);

    stream::iter(listings)
        .map(|mut listing| async move {
            if !listing.needs_detail() {
                return listing;
            }
            match client.fetch_listing(&listing.id).await {
                Ok(detail) => {
                    listing.page_rules = detail.page_rules;
                    listing.filter_rules = detail.filter_rules;
                    if listing.patterns.iter().flatten().next().is_none() {
                        listing.patterns = detail.patterns;
                    }
                }
                Err(e) => {
                    log::warn!(
                        "Could not fetch details for listing '{}' ({}): {}",
                        listing.name,
                        listing.id,
                        e
                    );
                }
            }
            listing
        })
        .buffered(DETAIL_FETCH_CONCURRENCY)
        .collect()
        .await
}

/// Fetch every listing for the client's tracking id and flatten to rows
pub async fn export_listings(client: &CoveoClient) -> Result<Vec<CsvRow>, ApiError> {
    let listings = client.fetch_all_listings().await?;
    let listings = resolve_legacy_rules(client, listings).await;
    let rows = listings_to_rows(&listings);
    log::info!("Exported {} listings as {} rows", listings.len(), rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing(value: serde_json::Value) -> ListingPageResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_filters_fan_out_across_locales() {
        let listings = vec![listing(json!({
            "id": "1",
            "name": "Shoes",
            "patterns": [{"url": "https://a.com"}, {"url": "https://b.com"}],
            "pageRules": [{
                "name": "r1",
                "filters": [
                    {"fieldName": "ec_category", "operator": "isExactly", "value": {"type": "string", "value": "Shoes"}},
                    {"fieldName": "ec_color", "operator": "isExactly", "value": {"type": "array", "values": ["red", "blue"]}}
                ],
                "locales": [{"language": "en"}, {"language": "fr", "country": "CA"}]
            }]
        }))];

        let rows = listings_to_rows(&listings);
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.url_pattern.as_deref() == Some("https://a.com;https://b.com")));
        assert_eq!(rows[0].filter_value.as_deref(), Some("Shoes"));
        assert_eq!(rows[0].language.as_deref(), Some("en"));
        assert_eq!(rows[1].filter_value.as_deref(), Some("red;blue"));
        assert_eq!(rows[1].language.as_deref(), Some("en"));
        assert_eq!(rows[2].language.as_deref(), Some("fr"));
        assert_eq!(rows[2].country.as_deref(), Some("CA"));
        assert_eq!(rows[3].filter_field.as_deref(), Some("ec_color"));
    }

    #[test]
    fn test_rule_without_filters_emits_locale_rows() {
        let listings = vec![listing(json!({
            "id": "1",
            "name": "Shoes",
            "patterns": [],
            "pageRules": [
                {"name": "locales only", "filters": [], "locales": [{"language": "en"}, {"language": "fr"}]},
                {"name": "empty", "filters": []}
            ]
        }))];

        let rows = listings_to_rows(&listings);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].language.as_deref(), Some("en"));
        assert_eq!(rows[1].language.as_deref(), Some("fr"));
        assert_eq!(rows[2], CsvRow { name: Some("Shoes".into()), ..CsvRow::default() });
    }

    #[test]
    fn test_legacy_filter_rules_are_used() {
        let listings = vec![listing(json!({
            "id": "1",
            "name": "Old",
            "patterns": [{"url": "https://a.com/old"}],
            "filterRules": [{
                "name": "legacy",
                "filters": [{"fieldName": "ec_price", "operator": "isGreaterThan", "value": {"type": "decimal", "value": 25}}]
            }]
        }))];

        let rows = listings_to_rows(&listings);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].filter_operator.as_deref(), Some("isGreaterThan"));
        assert_eq!(rows[0].filter_value.as_deref(), Some("25"));
    }

    #[test]
    fn test_listing_without_rules_is_bare_row() {
        let rows = listings_to_rows(&[listing(json!({
            "id": "1",
            "name": "Bare",
            "patterns": [{"url": "https://a.com/bare"}, null]
        }))]);
        let expected = CsvRow {
            name: Some("Bare".into()),
            url_pattern: Some("https://a.com/bare".into()),
            ..CsvRow::default()
        };
        assert_eq!(rows, vec![expected]);
    }
}
