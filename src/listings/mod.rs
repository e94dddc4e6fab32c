//! Listing-page import, export and upsert

pub mod csv_parser;
pub mod export;
pub mod import;
pub mod naming;
pub mod upsert;

pub use csv_parser::{parse_csv_rows, rows_to_csv_string, write_csv_rows, CsvParseError, CsvRow, RowError};
pub use export::{export_listings, listings_to_rows, pages_to_rows, resolve_legacy_rules};
pub use import::{add_rule, map_rows_to_listings, split_multi_value};
pub use upsert::{delete_all_listings, plan_upsert, push_listings, ImportSummary, UpsertPlan};
