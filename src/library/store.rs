//! List/cache coordinator.
//!
//! [`LibraryStore`] holds the current page of results with its cursor,
//! filters and status flags, and runs every library operation against the
//! service. Mutations never patch the cached page locally; they refetch it
//! at the existing cursor.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument, warn};

use super::error::{LibraryError, Operation};
use super::state::{FilterUpdate, Filters, ListCacheState};
use crate::api::filename::resolve_unique_path;
use crate::api::{ApiClient, Literature, UploadFile};
use crate::stream::EventSource;

/// Owner of the cached list state and entry point for library operations.
///
/// The state lock is never held across an await; operations may run
/// concurrently, and no ordering is enforced between overlapping fetches.
pub struct LibraryStore {
    api: ApiClient,
    source: Arc<dyn EventSource>,
    state: Mutex<ListCacheState>,
}

impl LibraryStore {
    /// Creates a store with an empty cache at page 1.
    #[must_use]
    pub fn new(api: ApiClient, source: Arc<dyn EventSource>) -> Self {
        Self {
            api,
            source,
            state: Mutex::new(ListCacheState::default()),
        }
    }

    /// Sets the page size of the initial cursor.
    #[must_use]
    pub fn with_page_size(self, page_size: u32) -> Self {
        self.state().page_size = page_size.max(1);
        self
    }

    /// A copy of the current cache state.
    #[must_use]
    pub fn snapshot(&self) -> ListCacheState {
        self.state().clone()
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub(crate) fn event_source(&self) -> Arc<dyn EventSource> {
        Arc::clone(&self.source)
    }

    /// Fetches `page` with `size` entries using the current filters.
    ///
    /// On failure the cached records stay untouched and `error` is set.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Request`] if the service call fails.
    #[instrument(skip(self))]
    pub async fn fetch_list(&self, page: u32, size: u32) -> Result<(), LibraryError> {
        let query = {
            let mut state = self.state();
            state.loading = true;
            state.error = None;
            state.filters.to_query(page, size)
        };

        match self.api.list(&query).await {
            Ok(result) => {
                debug!(records = result.records.len(), total = result.total, "list fetched");
                let mut state = self.state();
                state.records = result.records;
                state.total_count = result.total;
                state.current_page = page;
                state.page_size = size;
                state.loading = false;
                Ok(())
            }
            Err(e) => Err(self.fail(LibraryError::request(Operation::FetchList, e))),
        }
    }

    /// Refetches the page at the current cursor.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_list`].
    pub async fn refresh_current_page(&self) -> Result<(), LibraryError> {
        let (page, size) = self.cursor();
        self.fetch_list(page, size).await
    }

    /// Merges `update` into the filters without refetching.
    pub fn set_search_params(&self, update: FilterUpdate) {
        let mut state = self.state();
        state.filters.merge(update);
        debug!(filters = ?state.filters, "search params updated");
    }

    /// Clears all filters and fetches page 1 at the current page size.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_list`].
    pub async fn reset_filters(&self) -> Result<(), LibraryError> {
        let size = {
            let mut state = self.state();
            state.filters = Filters::default();
            state.page_size
        };
        self.fetch_list(1, size).await
    }

    /// Uploads one document, then refetches the current page.
    ///
    /// A failed refetch does not fail the upload; its message stays in `error`.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Request`] if the upload itself fails.
    #[instrument(skip(self, file), fields(file = %file.file_name))]
    pub async fn upload_one(&self, file: &UploadFile) -> Result<Literature, LibraryError> {
        self.begin();
        let literature = match self.api.upload(file).await {
            Ok(literature) => literature,
            Err(e) => return Err(self.fail(LibraryError::request(Operation::Upload, e))),
        };
        info!(id = literature.id, "document uploaded");

        if let Err(e) = self.refresh_current_page().await {
            warn!(error = %e, "list refresh after upload failed");
        }
        self.finish();
        Ok(literature)
    }

    /// Deletes one document, then refetches the current page.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Request`] if the delete itself fails.
    #[instrument(skip(self))]
    pub async fn delete_one(&self, id: i64) -> Result<(), LibraryError> {
        self.begin();
        if let Err(e) = self.api.delete(id).await {
            return Err(self.fail(LibraryError::request(Operation::Delete, e)));
        }
        info!(id, "document deleted");

        if let Err(e) = self.refresh_current_page().await {
            warn!(error = %e, "list refresh after delete failed");
        }
        self.finish();
        Ok(())
    }

    /// Fetches one entry. The cached page is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Request`] if the service call fails.
    #[instrument(skip(self))]
    pub async fn get_detail(&self, id: i64) -> Result<Literature, LibraryError> {
        self.begin();
        match self.api.detail(id).await {
            Ok(literature) => {
                self.finish();
                Ok(literature)
            }
            Err(e) => Err(self.fail(LibraryError::request(Operation::Detail, e))),
        }
    }

    /// Downloads a document's original file into `dir`.
    ///
    /// The file is named from the response's `Content-Disposition` header
    /// (`document` when absent) and never overwrites an existing file. Does
    /// not toggle `loading`.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Request`] if the download fails, or
    /// [`LibraryError::Io`] if the file cannot be written.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub async fn download_one(&self, id: i64, dir: &Path) -> Result<PathBuf, LibraryError> {
        self.state().error = None;

        let file = match self.api.download(id).await {
            Ok(file) => file,
            Err(e) => return Err(self.fail(LibraryError::request(Operation::Download, e))),
        };

        match save_new_file(dir, &file.file_name, &file.bytes).await {
            Ok(path) => {
                info!(path = %path.display(), bytes = file.bytes.len(), "document saved");
                Ok(path)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub(crate) fn cursor(&self) -> (u32, u32) {
        let state = self.state();
        (state.current_page, state.page_size)
    }

    pub(crate) fn begin(&self) {
        let mut state = self.state();
        state.loading = true;
        state.error = None;
    }

    pub(crate) fn finish(&self) {
        self.state().loading = false;
    }

    /// Records `err` in the state and hands it back for propagation.
    pub(crate) fn fail(&self, err: LibraryError) -> LibraryError {
        error!(error = %err, "library operation failed");
        let mut state = self.state();
        state.error = Some(err.user_message());
        state.loading = false;
        err
    }

    fn state(&self) -> MutexGuard<'_, ListCacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for LibraryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryStore")
            .field("api", &self.api)
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}

/// Writes `bytes` to a fresh file in `dir`; removes the partial file on failure.
async fn save_new_file(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, LibraryError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| LibraryError::io(dir, e))?;

    let path = resolve_unique_path(dir, file_name);
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| LibraryError::io(&path, e))?;

    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        debug!(path = %path.display(), "cleaning up partial file after error");
        drop(file);
        let _ = tokio::fs::remove_file(&path).await;
        return Err(LibraryError::io(path, e));
    }
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ClientConfig;
    use crate::stream::HttpEventSource;

    fn store() -> LibraryStore {
        let config = ClientConfig::with_base_url("http://127.0.0.1:9");
        LibraryStore::new(
            ApiClient::new(&config).unwrap(),
            Arc::new(HttpEventSource::new(&config).unwrap()),
        )
    }

    #[test]
    fn test_with_page_size_sets_cursor() {
        let sized = store().with_page_size(25);
        assert_eq!(sized.cursor(), (1, 25));
        assert_eq!(store().with_page_size(0).cursor(), (1, 1));
    }

    #[test]
    fn test_set_search_params_does_not_touch_status() {
        let store = store();
        store.set_search_params(FilterUpdate {
            tags: Some("ml".to_string()),
            ..FilterUpdate::default()
        });
        let state = store.snapshot();
        assert_eq!(state.filters.tags, "ml");
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_fail_records_user_message() {
        let store = store();
        store.begin();
        let err = store.fail(LibraryError::NoFiles);
        assert!(matches!(err, LibraryError::NoFiles));
        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("no files selected for import"));
    }

    #[tokio::test]
    async fn test_save_new_file_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let first = save_new_file(dir.path(), "report.pdf", b"one").await.unwrap();
        let second = save_new_file(dir.path(), "report.pdf", b"two").await.unwrap();
        assert_eq!(first.file_name().unwrap(), "report.pdf");
        assert_eq!(second.file_name().unwrap(), "report_2.pdf");
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
    }
}
