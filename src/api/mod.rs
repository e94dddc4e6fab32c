//! Coveo Commerce REST API client
//!
//! Listing-page bulk operations, paginated listing retrieval, global
//! configuration documents and the Search API, all behind one bearer-token
//! authenticated client.

pub mod client;
pub mod constants;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{ConnectionSettings, CoveoClient};
pub use error::ApiError;
pub use models::{
    Filter, FilterValue, ListingPage, ListingPageList, ListingPageResponse, Locale, PageRule,
    UrlPattern, DEFAULT_OPERATOR,
};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
