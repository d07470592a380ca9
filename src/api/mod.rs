//! Immich API access
//!
//! - [`client`]: the `PhotoApi` trait the rest of the crate is written against
//! - [`http`]: reqwest implementation talking to a real server
//! - [`mock`]: in-memory implementation for tests
//! - [`types`]: wire types

pub mod client;
pub mod error;
pub mod http;
pub mod mock;
pub mod types;

pub use client::PhotoApi;
pub use error::ApiError;
pub use http::{ClientOptions, ImmichClient};
pub use mock::{MockPhotoApi, RecordedCall};
pub use types::{
    AssetBulkUpdateRequest, AssetResponse, AssetStackSummary, MetadataSearchRequest,
    MetadataSearchResponse, SearchAssetPage, ServerVersion, StackCreateRequest, TimeBucket,
};
