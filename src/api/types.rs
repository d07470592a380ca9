//! Wire types for the subset of the Immich API the stacker consumes
//!
//! Field names follow the service's camelCase JSON. Only the fields the
//! stacker reads are modelled; everything else is ignored on decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Response of `GET server/version`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Stack summary attached to an asset when listing with `withStacked=true`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetStackSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub asset_count: u32,
    #[serde(default)]
    pub primary_asset_id: Option<String>,
}

/// One asset as returned by the listing endpoints
///
/// Older servers report stack membership through `stackCount` and
/// `stackParentId` instead of the nested `stack` object; both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    pub id: String,
    pub original_file_name: String,
    #[serde(default)]
    pub file_created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stack: Option<AssetStackSummary>,
    #[serde(default)]
    pub stack_count: Option<u32>,
    #[serde(default)]
    pub stack_parent_id: Option<String>,
}

impl AssetResponse {
    /// True when the service reports the asset as part of an existing stack
    pub fn is_stacked(&self) -> bool {
        self.stack.as_ref().is_some_and(|s| s.asset_count > 0)
            || self.stack_count.is_some_and(|c| c > 0)
            || self.stack_parent_id.is_some()
    }
}

/// Entry of `GET timeline/buckets`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBucket {
    pub time_bucket: String,
    pub count: usize,
}

/// Body of `POST search/metadata`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSearchRequest {
    pub page: u32,
    pub size: u32,
    pub with_stacked: bool,
}

/// Response of `POST search/metadata`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSearchResponse {
    pub assets: SearchAssetPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAssetPage {
    pub items: Vec<AssetResponse>,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub count: usize,
}

/// Body of `POST stacks`; the first id becomes the stack's primary asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackCreateRequest {
    pub asset_ids: Vec<Uuid>,
}

/// Body of `PUT assets` as used by the legacy stacking protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBulkUpdateRequest {
    pub ids: Vec<Uuid>,
    pub stack_parent_id: Uuid,
}
