//! Constants for the API client (timeouts, endpoint paths, limits).

/// Default base URL of the literature service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout for API calls (30 seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of files the service accepts in one batch import.
pub const MAX_BATCH_FILES: usize = 16;

/// Envelope code the service uses for successful responses.
pub(crate) const SUCCESS_CODE: i64 = 200;

pub(crate) const LIST_PATH: &str = "literature/list";
pub(crate) const UPLOAD_PATH: &str = "literature/upload";
pub(crate) const BATCH_IMPORT_PATH: &str = "literature/batch-import";
pub(crate) const BATCH_PROGRESS_PATH: &str = "literature/batch-import/progress";
pub(crate) const DOWNLOAD_PATH: &str = "literature/download";
pub(crate) const ITEM_PATH: &str = "literature";
