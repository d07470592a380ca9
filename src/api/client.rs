use super::error::ApiError;
use super::types::{
    AssetBulkUpdateRequest, AssetResponse, MetadataSearchRequest, MetadataSearchResponse,
    ServerVersion, StackCreateRequest, TimeBucket,
};
use async_trait::async_trait;

/// The Immich endpoints the stacker depends on
///
/// Implementations own the success-status contract: each method returns
/// `ApiError::UnexpectedStatus` when the service answers with anything other
/// than the documented status for that call.
#[async_trait]
pub trait PhotoApi: Send + Sync {
    /// `GET server/version`, expects 200
    async fn server_version(&self) -> Result<ServerVersion, ApiError>;

    /// `GET timeline/buckets`, expects 200
    async fn time_buckets(&self) -> Result<Vec<TimeBucket>, ApiError>;

    /// `GET timeline/bucket`, expects 200
    async fn time_bucket(&self, time_bucket: &str) -> Result<Vec<AssetResponse>, ApiError>;

    /// `POST search/metadata`, expects 200
    async fn search_metadata(
        &self,
        request: MetadataSearchRequest,
    ) -> Result<MetadataSearchResponse, ApiError>;

    /// `POST stacks`, expects 201
    async fn create_stack(&self, request: StackCreateRequest) -> Result<(), ApiError>;

    /// `PUT assets`, expects 204
    async fn update_assets(&self, request: AssetBulkUpdateRequest) -> Result<(), ApiError>;

    /// Human-readable description of the backing service
    fn describe(&self) -> String;
}
