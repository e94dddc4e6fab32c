//! Create-or-update decision for an imported batch
//!
//! Existing listings are matched by exact name. The decision is made once,
//! before any write, so every chunk follows the same plan.

use crate::api::{ApiError, CoveoClient, ListingPage, ListingPageResponse};
use std::collections::HashMap;
use std::fmt;

/// Listings split by the bulk endpoint they go to
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpsertPlan {
    pub to_create: Vec<ListingPage>,
    pub to_update: Vec<ListingPage>,
}

/// Outcome of pushing an imported batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub total_parsed: usize,
    pub created: usize,
    pub updated: usize,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully processed {} listings: {} created, {} updated.",
            self.total_parsed, self.created, self.updated
        )
    }
}

/// Partition parsed listings against what already exists on the server
///
/// Update candidates get the existing listing's id attached.
pub fn plan_upsert(parsed: Vec<ListingPage>, existing: &[ListingPageResponse]) -> UpsertPlan {
    let mut ids_by_name: HashMap<&str, &str> = HashMap::new();
    for listing in existing {
        ids_by_name
            .entry(listing.name.as_str())
            .or_insert(listing.id.as_str());
    }

    let mut plan = UpsertPlan::default();
    for mut listing in parsed {
        match ids_by_name.get(listing.name.as_str()) {
            Some(id) => {
                listing.id = Some(id.to_string());
                plan.to_update.push(listing);
            }
            None => plan.to_create.push(listing),
        }
    }
    plan
}

/// Fetch existing listings, falling back to "none exist" on failure
pub async fn fetch_existing_or_empty(client: &CoveoClient) -> Vec<ListingPageResponse> {
    match client.fetch_all_listings().await {
        Ok(existing) => existing,
        Err(e) => {
            log::warn!(
                "Could not fetch existing listings, assuming creation mode: {}",
                e
            );
            Vec::new()
        }
    }
}

/// Push a batch: updates first, then creations
pub async fn push_listings(
    client: &CoveoClient,
    listings: Vec<ListingPage>,
) -> Result<ImportSummary, ApiError> {
    let mut summary = ImportSummary {
        total_parsed: listings.len(),
        ..ImportSummary::default()
    };

    let existing = fetch_existing_or_empty(client).await;
    let plan = plan_upsert(listings, &existing);
    log::info!(
        "Upsert plan: {} to update, {} to create",
        plan.to_update.len(),
        plan.to_create.len()
    );

    if !plan.to_update.is_empty() {
        client.bulk_update(&plan.to_update).await?;
        summary.updated = plan.to_update.len();
    }

    if !plan.to_create.is_empty() {
        client.bulk_create(&plan.to_create).await?;
        summary.created = plan.to_create.len();
    }

    Ok(summary)
}

/// Delete every listing for the client's tracking id, returning how many
pub async fn delete_all_listings(client: &CoveoClient) -> Result<usize, ApiError> {
    let ids: Vec<String> = client
        .fetch_all_listings()
        .await?
        .into_iter()
        .map(|listing| listing.id)
        .collect();

    if ids.is_empty() {
        log::info!("No listings to delete");
        return Ok(0);
    }

    client.bulk_delete(&ids).await?;
    log::info!("Deleted {} listings", ids.len());
    Ok(ids.len())
}
