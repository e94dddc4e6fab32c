use colored::Colorize;
use merch_hub::api::{ListingPage, PageRule};

const NAME_WIDTH: usize = 40;

fn describe_rule(rule: &PageRule) -> String {
    let filters: Vec<String> = rule
        .filters
        .iter()
        .map(|f| format!("{} {} {}", f.field_name, f.operator, f.value.render()))
        .collect();
    let mut text = filters.join(" AND ");
    if let Some(locale) = rule.locale() {
        text.push_str(&format!(" [{}]", locale.label()));
    }
    text
}

fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        format!("{:<width$}", text, width = width)
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Print what an import would send, one block per listing
pub fn print_listing_preview(listings: &[ListingPage]) {
    println!(
        "{}  {}",
        fit("Listing", NAME_WIDTH).bold(),
        "Patterns / Rules".bold()
    );
    println!("{}", "─".repeat(NAME_WIDTH + 40).dimmed());

    for listing in listings {
        let patterns: Vec<&str> = listing.patterns.iter().map(|p| p.url.as_str()).collect();
        let pattern_text = if patterns.is_empty() {
            "(no URL pattern)".dimmed().to_string()
        } else {
            patterns.join(", ").cyan().to_string()
        };
        println!("{}  {}", fit(&listing.name, NAME_WIDTH).bright_white(), pattern_text);

        for rule in &listing.page_rules {
            println!(
                "{}  {} {}",
                " ".repeat(NAME_WIDTH),
                "•".dimmed(),
                describe_rule(rule)
            );
        }
    }

    let rule_count: usize = listings.iter().map(|l| l.page_rules.len()).sum();
    println!();
    println!(
        "{} listing(s), {} rule(s)",
        listings.len().to_string().bright_green(),
        rule_count.to_string().bright_green()
    );
}
