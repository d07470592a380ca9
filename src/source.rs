//! Asset Source: pulls the complete asset universe from the server
//!
//! Pagination is strictly sequential. Any failure while listing aborts the
//! fetch, since a partial universe would silently under-group assets.
//! Assets that already belong to a stack are dropped here and never reach
//! key derivation.

use crate::api::{ApiError, AssetResponse, MetadataSearchRequest, PhotoApi};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Errors that abort fetching the asset universe
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Asset {id} has an invalid id: {source}")]
    InvalidAssetId {
        id: String,
        #[source]
        source: uuid::Error,
    },

    #[error("Invalid next page '{next_page}' after page {page}")]
    InvalidCursor { page: u32, next_page: String },
}

/// A remote media item, as far as stacking is concerned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: Uuid,
    pub original_file_name: String,
    pub file_created_at: Option<DateTime<Utc>>,
}

impl Asset {
    pub fn new(id: Uuid, original_file_name: impl Into<String>) -> Self {
        Self {
            id,
            original_file_name: original_file_name.into(),
            file_created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.file_created_at = Some(created_at);
        self
    }
}

impl TryFrom<AssetResponse> for Asset {
    type Error = SourceError;

    fn try_from(response: AssetResponse) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&response.id).map_err(|source| SourceError::InvalidAssetId {
            id: response.id.clone(),
            source,
        })?;

        Ok(Self {
            id,
            original_file_name: response.original_file_name,
            file_created_at: response.file_created_at,
        })
    }
}

/// How the asset universe is enumerated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingStrategy {
    /// Month-sized timeline buckets, one request per bucket
    #[default]
    Timeline,
    /// Page-numbered metadata search
    Search,
}

impl FromStr for ListingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "timeline" => Ok(ListingStrategy::Timeline),
            "search" => Ok(ListingStrategy::Search),
            other => Err(format!(
                "Invalid listing strategy: {}. Valid options: timeline, search",
                other
            )),
        }
    }
}

impl fmt::Display for ListingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingStrategy::Timeline => write!(f, "timeline"),
            ListingStrategy::Search => write!(f, "search"),
        }
    }
}

/// Result of a complete fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetListing {
    /// Unstacked assets, in the order the server returned them
    pub assets: Vec<Asset>,
    /// Every asset the server returned, stacked or not
    pub total_seen: usize,
    /// Assets dropped because they already belong to a stack
    pub already_stacked: usize,
}

impl AssetListing {
    fn push(&mut self, response: AssetResponse) -> Result<(), SourceError> {
        self.total_seen += 1;
        if response.is_stacked() {
            self.already_stacked += 1;
            return Ok(());
        }
        self.assets.push(Asset::try_from(response)?);
        Ok(())
    }
}

pub struct AssetSource {
    api: Arc<dyn PhotoApi>,
    strategy: ListingStrategy,
}

impl AssetSource {
    pub fn new(api: Arc<dyn PhotoApi>, strategy: ListingStrategy) -> Self {
        Self { api, strategy }
    }

    /// Fetches every asset, dropping those already stacked
    ///
    /// `page_size` applies to the search strategy; timeline buckets are
    /// sized by the server.
    pub async fn fetch_all(&self, page_size: u32) -> Result<AssetListing, SourceError> {
        let listing = match self.strategy {
            ListingStrategy::Timeline => self.fetch_timeline().await?,
            ListingStrategy::Search => self.fetch_search(page_size).await?,
        };

        info!(
            total = listing.total_seen,
            already_stacked = listing.already_stacked,
            unstacked = listing.assets.len(),
            "Retrieved assets"
        );

        Ok(listing)
    }

    async fn fetch_timeline(&self) -> Result<AssetListing, SourceError> {
        info!("Requesting all time buckets");

        let buckets = self.api.time_buckets().await?;
        let mut listing = AssetListing::default();

        for bucket in buckets {
            debug!(
                time_bucket = %bucket.time_bucket,
                count = bucket.count,
                "Requesting time bucket"
            );

            let assets = self.api.time_bucket(&bucket.time_bucket).await?;

            debug!(
                time_bucket = %bucket.time_bucket,
                expected = bucket.count,
                got = assets.len(),
                "Retrieved time bucket"
            );

            for asset in assets {
                listing.push(asset)?;
            }
        }

        Ok(listing)
    }

    async fn fetch_search(&self, page_size: u32) -> Result<AssetListing, SourceError> {
        info!(page_size, "Searching all assets");

        let mut listing = AssetListing::default();
        let mut page = 1;

        loop {
            let response = self
                .api
                .search_metadata(MetadataSearchRequest {
                    page,
                    size: page_size,
                    with_stacked: true,
                })
                .await?
                .assets;

            debug!(
                page,
                total = response.total,
                got = response.items.len(),
                next_page = ?response.next_page,
                "Retrieved search page"
            );

            for asset in response.items {
                listing.push(asset)?;
            }

            let Some(next_page) = response.next_page else {
                break;
            };

            page = match next_page.parse::<u32>() {
                Ok(next) if next > page => next,
                _ => return Err(SourceError::InvalidCursor { page, next_page }),
            };
        }

        Ok(listing)
    }
}
