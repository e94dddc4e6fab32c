//! Generated rule names
//!
//! Names look like `Rule: ec_category isExactly Summer [en-US]`, stay within
//! 255 characters and are made unique per listing with a ` (n)` suffix.
//! Lengths are counted in characters.

use crate::api::{ListingPage, Locale};

/// Hard limit imposed by the API on rule names
pub const MAX_RULE_NAME_LEN: usize = 255;

/// Longest value list shown verbatim inside a generated name
pub const MAX_VALUE_DISPLAY_LEN: usize = 150;

/// First `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Values joined with `;`, shortened with a `... (N values)` marker when long
pub fn display_values(values: &[String]) -> String {
    let joined = values.join(";");
    if joined.chars().count() <= MAX_VALUE_DISPLAY_LEN {
        return joined;
    }
    let count = values.len().max(1);
    format!(
        "{}... ({} value{})",
        truncate_chars(&joined, MAX_VALUE_DISPLAY_LEN),
        count,
        if count > 1 { "s" } else { "" }
    )
}

/// Untruncated descriptive name for a single-filter rule
pub fn rule_base_name(
    field: &str,
    operator: &str,
    values: &[String],
    locale: Option<&Locale>,
) -> String {
    let locale_suffix = locale
        .map(|l| format!(" [{}]", l.label()))
        .unwrap_or_default();
    format!(
        "Rule: {} {} {}{}",
        field,
        operator,
        display_values(values),
        locale_suffix
    )
}

/// Clamp a name to the API limit, marking the cut with `...`
fn bound_name(base: &str) -> String {
    if base.chars().count() > MAX_RULE_NAME_LEN {
        format!("{}...", truncate_chars(base, MAX_RULE_NAME_LEN - 5))
    } else {
        base.to_string()
    }
}

/// A name derived from `base` that no rule on `listing` uses yet
pub fn unique_rule_name(listing: &ListingPage, base: &str) -> String {
    let mut name = bound_name(base);
    let mut counter = 1;

    while listing.has_rule_named(&name) {
        counter += 1;
        let suffix = format!(" ({})", counter);
        let room = MAX_RULE_NAME_LEN - suffix.chars().count();
        name = format!("{}{}", truncate_chars(base, room), suffix);
    }

    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PageRule;

    fn listing_with_rules(names: &[&str]) -> ListingPage {
        let mut listing = ListingPage::new("Shoes", "store");
        for name in names {
            listing.page_rules.push(PageRule {
                name: name.to_string(),
                filters: Vec::new(),
                locales: None,
            });
        }
        listing
    }

    #[test]
    fn test_base_name_with_locale() {
        let locale = Locale::from_parts(Some("en"), Some("US"), Some("USD"));
        let name = rule_base_name(
            "ec_category",
            "isExactly",
            &["Summer".to_string()],
            locale.as_ref(),
        );
        assert_eq!(name, "Rule: ec_category isExactly Summer [en-US-USD]");
    }

    #[test]
    fn test_partial_locale_suffix() {
        let locale = Locale::from_parts(None, Some("CA"), None);
        let name = rule_base_name("ec_brand", "contains", &["Trek".to_string()], locale.as_ref());
        assert_eq!(name, "Rule: ec_brand contains Trek [CA]");
    }

    #[test]
    fn test_long_value_list_is_summarised() {
        let values: Vec<String> = (0..40).map(|i| format!("value-{:02}", i)).collect();
        let display = display_values(&values);
        assert!(display.ends_with("... (40 values)"));
        assert_eq!(display.chars().count(), 150 + "... (40 values)".len());
    }

    #[test]
    fn test_single_long_value_uses_singular() {
        let display = display_values(&["x".repeat(200)]);
        assert!(display.ends_with("... (1 value)"));
    }

    #[test]
    fn test_collisions_get_increasing_suffixes() {
        let listing = listing_with_rules(&["Rule: a b c", "Rule: a b c (2)"]);
        assert_eq!(unique_rule_name(&listing, "Rule: a b c"), "Rule: a b c (3)");
        assert_eq!(unique_rule_name(&listing, "Rule: other"), "Rule: other");
    }

    #[test]
    fn test_long_names_stay_within_limit() {
        let base = format!("Rule: f op {}", "é".repeat(300));
        let first = unique_rule_name(&listing_with_rules(&[]), &base);
        assert_eq!(first.chars().count(), 253);
        assert!(first.ends_with("..."));

        let listing = listing_with_rules(&[&first]);
        let second = unique_rule_name(&listing, &base);
        assert_eq!(second.chars().count(), MAX_RULE_NAME_LEN);
        assert!(second.ends_with(" (2)"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
