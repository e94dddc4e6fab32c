//! CSV rows to listing pages
//!
//! Rows sharing a trimmed `Name` merge into one listing page, in order of
//! first appearance. URL patterns and equivalent rules are deduplicated;
//! pages that end up without any rule are dropped because the API rejects
//! them.

use super::csv_parser::CsvRow;
use super::naming::{rule_base_name, unique_rule_name};
use crate::api::{Filter, FilterValue, ListingPage, Locale, PageRule, DEFAULT_OPERATOR};
use std::collections::HashMap;

/// Split a multi-value cell on `;`, trimming and dropping empty pieces
pub fn split_multi_value(cell: &str) -> Vec<String> {
    cell.split(';')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

fn cell(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Group rows into listing pages for `tracking_id`
pub fn map_rows_to_listings(rows: &[CsvRow], tracking_id: &str) -> Vec<ListingPage> {
    let mut listings: Vec<ListingPage> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Some(name) = cell(&row.name) else {
            continue;
        };

        let index = *index_by_name.entry(name.to_string()).or_insert_with(|| {
            listings.push(ListingPage::new(name, tracking_id));
            listings.len() - 1
        });
        let listing = &mut listings[index];

        if let Some(patterns) = cell(&row.url_pattern) {
            for url in split_multi_value(patterns) {
                listing.add_pattern(&url);
            }
        }

        let (Some(field), Some(raw_values)) = (cell(&row.filter_field), cell(&row.filter_value))
        else {
            continue;
        };

        let values = split_multi_value(raw_values);
        if values.is_empty() {
            log::debug!("Listing '{}': filter on '{}' has no usable values", name, field);
            continue;
        }

        let field = field.to_lowercase();
        let operator = cell(&row.filter_operator).unwrap_or(DEFAULT_OPERATOR);
        let locale = Locale::from_parts(
            row.language.as_deref(),
            row.country.as_deref(),
            row.currency.as_deref(),
        );
        let base_name = rule_base_name(&field, operator, &values, locale.as_ref());
        let filter = Filter {
            field_name: field,
            operator: operator.to_string(),
            value: FilterValue::from_values(values),
        };

        add_rule(listing, filter, locale, &base_name);
    }

    let total = listings.len();
    let listings: Vec<ListingPage> = listings
        .into_iter()
        .filter(|listing| !listing.page_rules.is_empty())
        .collect();
    if listings.len() < total {
        log::info!(
            "Dropped {} listing(s) without any filter rule",
            total - listings.len()
        );
    }

    listings
}

/// Add a single-filter rule unless an equivalent one exists
///
/// The name is derived from `base_name` and made unique on the page.
/// Returns whether the rule was added.
pub fn add_rule(
    listing: &mut ListingPage,
    filter: Filter,
    locale: Option<Locale>,
    base_name: &str,
) -> bool {
    if listing.has_equivalent_rule(&filter, locale.as_ref()) {
        log::debug!(
            "Listing '{}': skipping duplicate rule on '{}'",
            listing.name,
            filter.field_name
        );
        return false;
    }

    let name = unique_rule_name(listing, base_name);
    listing.page_rules.push(PageRule {
        name,
        filters: vec![filter],
        locales: locale.map(|l| vec![l]),
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, url: &str, field: &str, value: &str) -> CsvRow {
        CsvRow {
            name: Some(name.to_string()),
            url_pattern: Some(url.to_string()),
            filter_field: Some(field.to_string()),
            filter_value: Some(value.to_string()),
            ..CsvRow::default()
        }
    }

    #[test]
    fn test_rows_merge_by_trimmed_name() {
        let rows = vec![
            CsvRow {
                language: Some("en".into()),
                ..row("Summer Sale", "https://a.com/s", "ec_category", "Summer")
            },
            CsvRow {
                language: Some("fr".into()),
                ..row(" Summer Sale ", "https://b.com/e", "ec_category", "Ete")
            },
        ];

        let listings = map_rows_to_listings(&rows, "store");
        assert_eq!(listings.len(), 1);

        let listing = &listings[0];
        assert_eq!(listing.name, "Summer Sale");
        assert_eq!(listing.tracking_id, "store");
        assert_eq!(listing.patterns.len(), 2);
        assert_eq!(listing.page_rules.len(), 2);
        assert_eq!(listing.page_rules[0].name, "Rule: ec_category isExactly Summer [en]");
        assert_eq!(listing.page_rules[1].name, "Rule: ec_category isExactly Ete [fr]");
        assert_eq!(
            listing.page_rules[1].locale().and_then(|l| l.language.as_deref()),
            Some("fr")
        );
    }

    #[test]
    fn test_multi_value_cell_becomes_one_array_filter() {
        let listings =
            map_rows_to_listings(&[row("Colors", "", "ec_color", "red;blue;green")], "store");
        let rules = &listings[0].page_rules;
        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0].filters[0].value,
            FilterValue::Array {
                values: vec!["red".into(), "blue".into(), "green".into()]
            }
        );
        assert_eq!(rules[0].name, "Rule: ec_color isExactly red;blue;green");
    }

    #[test]
    fn test_duplicate_rules_collapse() {
        let rows = vec![
            row("Colors", "", "ec_color", "red;blue"),
            row("Colors", "", "EC_COLOR", "blue; red"),
            row("Colors", "", "ec_color", "red"),
            row("Colors", "", "ec_color", "red "),
        ];
        let listings = map_rows_to_listings(&rows, "store");
        assert_eq!(listings[0].page_rules.len(), 2);
    }

    #[test]
    fn test_locale_distinguishes_rules() {
        let rows = vec![
            row("Shoes", "", "ec_category", "Shoes"),
            CsvRow {
                country: Some("US".into()),
                ..row("Shoes", "", "ec_category", "Shoes")
            },
            CsvRow {
                country: Some("US".into()),
                currency: Some("".into()),
                ..row("Shoes", "", "ec_category", "Shoes")
            },
        ];
        let listings = map_rows_to_listings(&rows, "store");
        assert_eq!(listings[0].page_rules.len(), 2);
        assert!(listings[0].page_rules[0].locales.is_none());
    }

    #[test]
    fn test_url_patterns_dedup_in_first_seen_order() {
        let rows = vec![
            row("Shoes", "https://b.com; https://a.com", "ec_category", "Shoes"),
            row("Shoes", "https://a.com;;https://c.com", "ec_category", "Boots"),
            row("Shoes", "https://A.com", "", ""),
        ];
        let listings = map_rows_to_listings(&rows, "store");
        let urls: Vec<&str> = listings[0].patterns.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["https://b.com", "https://a.com", "https://c.com", "https://A.com"]);
    }

    #[test]
    fn test_listings_without_rules_are_dropped() {
        let rows = vec![
            row("No Filter", "https://a.com/x", "", ""),
            row("Missing Value", "https://a.com/y", "ec_category", ""),
            row("Only Separators", "https://a.com/z", "ec_category", " ; ;"),
            row("Kept", "https://a.com/k", "ec_category", "Kept"),
            CsvRow::default(),
            row("   ", "https://a.com/blank", "ec_category", "Blank"),
        ];
        let listings = map_rows_to_listings(&rows, "store");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].name, "Kept");
    }

    #[test]
    fn test_first_seen_order_is_preserved() {
        let rows = vec![
            row("B", "", "f", "1"),
            row("A", "", "f", "1"),
            row("B", "", "f", "2"),
            row("C", "", "f", "1"),
        ];
        let names: Vec<String> = map_rows_to_listings(&rows, "store")
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_operator_defaults_and_is_kept_verbatim() {
        let rows = vec![
            row("Shoes", "", "ec_name", "boot"),
            CsvRow {
                filter_operator: Some("contains".into()),
                ..row("Shoes", "", "ec_name", "boot")
            },
        ];
        let rules = &map_rows_to_listings(&rows, "store")[0].page_rules;
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].filters[0].operator, "isExactly");
        assert_eq!(rules[1].filters[0].operator, "contains");
    }

    #[test]
    fn test_truncated_names_collide_into_counter() {
        let prefix = "v".repeat(160);
        let rows = vec![
            row("Long", "", "f", &format!("{};a", prefix)),
            row("Long", "", "f", &format!("{};b", prefix)),
            row("Long", "", "f", &format!("{};c", prefix)),
        ];
        let rules = &map_rows_to_listings(&rows, "store")[0].page_rules;
        assert_eq!(rules.len(), 3);
        assert!(rules[1].name.ends_with("values) (2)"));
        assert!(rules[2].name.ends_with("values) (3)"));
        assert!(rules.iter().all(|r| r.name.chars().count() <= 255));
    }
}
