//! API constants and endpoint builders for the Coveo platform

/// Maximum number of listings (or ids) sent in one bulk request
pub const BULK_CHUNK_SIZE: usize = 50;

/// Page size used when listing existing listing pages
pub const LIST_PAGE_SIZE: u32 = 100;

/// Default (US) platform URL
pub const DEFAULT_PLATFORM_URL: &str = "https://platform.cloud.coveo.com";

/// Standard headers
pub mod headers {
    pub const ACCEPT: &str = "Accept";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const ORGANIZATION_ID: &str = "organizationId";
    pub const CONTENT_TYPE_JSON: &str = "application/json";
}

/// Strip the trailing slash from a platform URL
pub fn base_url(platform_url: &str) -> &str {
    platform_url.trim_end_matches('/')
}

/// `…/rest/organizations/{org}/commerce/v2`
pub fn commerce_path(platform_url: &str, organization_id: &str) -> String {
    format!(
        "{}/rest/organizations/{}/commerce/v2",
        base_url(platform_url),
        urlencoding::encode(organization_id)
    )
}

pub fn listings_endpoint(platform_url: &str, organization_id: &str) -> String {
    format!("{}/listings/pages", commerce_path(platform_url, organization_id))
}

pub fn listing_endpoint(platform_url: &str, organization_id: &str, id: &str) -> String {
    format!(
        "{}/{}",
        listings_endpoint(platform_url, organization_id),
        urlencoding::encode(id)
    )
}

pub fn bulk_create_endpoint(platform_url: &str, organization_id: &str) -> String {
    format!("{}/bulk-create", listings_endpoint(platform_url, organization_id))
}

pub fn bulk_update_endpoint(platform_url: &str, organization_id: &str) -> String {
    format!("{}/bulk-update", listings_endpoint(platform_url, organization_id))
}

pub fn bulk_delete_endpoint(platform_url: &str, organization_id: &str) -> String {
    format!("{}/bulk-delete", listings_endpoint(platform_url, organization_id))
}

pub fn search_config_endpoint(platform_url: &str, organization_id: &str) -> String {
    format!(
        "{}/configurations/search/global",
        commerce_path(platform_url, organization_id)
    )
}

pub fn listing_config_endpoint(platform_url: &str, organization_id: &str) -> String {
    format!(
        "{}/configurations/listings/global",
        commerce_path(platform_url, organization_id)
    )
}

pub fn product_suggest_config_endpoint(platform_url: &str, organization_id: &str) -> String {
    format!(
        "{}/configurations/productSuggest",
        commerce_path(platform_url, organization_id)
    )
}

pub fn recommendation_config_endpoint(platform_url: &str, organization_id: &str) -> String {
    format!(
        "{}/recommendations/slots/global/query-configuration",
        commerce_path(platform_url, organization_id)
    )
}

/// Search API v2 (facet enumeration for the category generator)
pub fn search_endpoint(platform_url: &str) -> String {
    format!("{}/rest/search/v2", base_url(platform_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_stripped() {
        assert_eq!(
            bulk_create_endpoint("https://platform-eu.cloud.coveo.com/", "acme"),
            "https://platform-eu.cloud.coveo.com/rest/organizations/acme/commerce/v2/listings/pages/bulk-create"
        );
        assert_eq!(
            search_endpoint("https://platform.cloud.coveo.com//"),
            "https://platform.cloud.coveo.com/rest/search/v2"
        );
    }

    #[test]
    fn test_listing_detail_endpoint() {
        assert_eq!(
            listing_endpoint(DEFAULT_PLATFORM_URL, "acme", "a1b2"),
            "https://platform.cloud.coveo.com/rest/organizations/acme/commerce/v2/listings/pages/a1b2"
        );
    }
}
