use super::client::PhotoApi;
use super::error::ApiError;
use super::types::{
    AssetBulkUpdateRequest, AssetResponse, MetadataSearchRequest, MetadataSearchResponse,
    SearchAssetPage, ServerVersion, StackCreateRequest, TimeBucket,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// A call observed by [`MockPhotoApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    ServerVersion,
    TimeBuckets,
    TimeBucket(String),
    SearchMetadata(MetadataSearchRequest),
    CreateStack(StackCreateRequest),
    UpdateAssets(AssetBulkUpdateRequest),
}

impl RecordedCall {
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            RecordedCall::CreateStack(_) | RecordedCall::UpdateAssets(_)
        )
    }
}

/// In-memory [`PhotoApi`] for tests
///
/// Listing endpoints answer from the configured buckets and search pages.
/// Mutating endpoints pop queued results and succeed once the queue is empty.
/// Every call is recorded.
pub struct MockPhotoApi {
    version: Mutex<Result<ServerVersion, ApiError>>,
    buckets: Mutex<Vec<(TimeBucket, Result<Vec<AssetResponse>, ApiError>)>>,
    bucket_list_error: Mutex<Option<ApiError>>,
    search_pages: Mutex<HashMap<u32, Result<SearchAssetPage, ApiError>>>,
    apply_results: Mutex<VecDeque<Result<(), ApiError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockPhotoApi {
    pub fn new() -> Self {
        Self {
            version: Mutex::new(Ok(ServerVersion {
                major: 1,
                minor: 118,
                patch: 0,
            })),
            buckets: Mutex::new(Vec::new()),
            bucket_list_error: Mutex::new(None),
            search_pages: Mutex::new(HashMap::new()),
            apply_results: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_version(&self, version: Result<ServerVersion, ApiError>) {
        *self.version.lock().unwrap() = version;
    }

    /// Adds a timeline bucket whose reported count matches its assets
    pub fn add_bucket(&self, name: impl Into<String>, assets: Vec<AssetResponse>) {
        let bucket = TimeBucket {
            time_bucket: name.into(),
            count: assets.len(),
        };
        self.buckets.lock().unwrap().push((bucket, Ok(assets)));
    }

    /// Adds a timeline bucket that is listed but fails when fetched
    pub fn add_failing_bucket(&self, name: impl Into<String>, error: ApiError) {
        let bucket = TimeBucket {
            time_bucket: name.into(),
            count: 0,
        };
        self.buckets.lock().unwrap().push((bucket, Err(error)));
    }

    pub fn fail_bucket_listing(&self, error: ApiError) {
        *self.bucket_list_error.lock().unwrap() = Some(error);
    }

    /// Registers the response for search page `page` (pages start at 1)
    pub fn add_search_page(&self, page: u32, result: Result<SearchAssetPage, ApiError>) {
        self.search_pages.lock().unwrap().insert(page, result);
    }

    /// Queues the outcome of the next create/update call
    pub fn queue_apply_result(&self, result: Result<(), ApiError>) {
        self.apply_results.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutating_calls(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(RecordedCall::is_mutating)
            .collect()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_apply_result(&self) -> Result<(), ApiError> {
        self.apply_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

impl Default for MockPhotoApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PhotoApi for MockPhotoApi {
    async fn server_version(&self) -> Result<ServerVersion, ApiError> {
        self.record(RecordedCall::ServerVersion);
        self.version.lock().unwrap().clone()
    }

    async fn time_buckets(&self) -> Result<Vec<TimeBucket>, ApiError> {
        self.record(RecordedCall::TimeBuckets);
        if let Some(error) = self.bucket_list_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self
            .buckets
            .lock()
            .unwrap()
            .iter()
            .map(|(bucket, _)| bucket.clone())
            .collect())
    }

    async fn time_bucket(&self, time_bucket: &str) -> Result<Vec<AssetResponse>, ApiError> {
        self.record(RecordedCall::TimeBucket(time_bucket.to_string()));
        self.buckets
            .lock()
            .unwrap()
            .iter()
            .find(|(bucket, _)| bucket.time_bucket == time_bucket)
            .map(|(_, assets)| assets.clone())
            .unwrap_or_else(|| Err(ApiError::unexpected_status("get time bucket", 200, 404)))
    }

    async fn search_metadata(
        &self,
        request: MetadataSearchRequest,
    ) -> Result<MetadataSearchResponse, ApiError> {
        let page = request.page;
        self.record(RecordedCall::SearchMetadata(request));
        let result = self.search_pages.lock().unwrap().get(&page).cloned();
        match result {
            Some(Ok(assets)) => Ok(MetadataSearchResponse { assets }),
            Some(Err(error)) => Err(error),
            None => Ok(MetadataSearchResponse {
                assets: SearchAssetPage {
                    items: Vec::new(),
                    next_page: None,
                    total: 0,
                    count: 0,
                },
            }),
        }
    }

    async fn create_stack(&self, request: StackCreateRequest) -> Result<(), ApiError> {
        self.record(RecordedCall::CreateStack(request));
        self.next_apply_result()
    }

    async fn update_assets(&self, request: AssetBulkUpdateRequest) -> Result<(), ApiError> {
        self.record(RecordedCall::UpdateAssets(request));
        self.next_apply_result()
    }

    fn describe(&self) -> String {
        "MockPhotoApi".to_string()
    }
}
