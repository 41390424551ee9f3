//! Library operations and the cached list state.
//!
//! [`LibraryStore`] is the single owner of the current page of results. All
//! operations go through it so the `loading`/`error` flags stay consistent:
//!
//! - list: [`LibraryStore::fetch_list`], [`LibraryStore::set_search_params`],
//!   [`LibraryStore::reset_filters`]
//! - single documents: [`LibraryStore::upload_one`], [`LibraryStore::download_one`],
//!   [`LibraryStore::get_detail`], [`LibraryStore::delete_one`]
//! - batch import: [`LibraryStore::batch_import_literature`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use literature_core::api::{ApiClient, ClientConfig, UploadFile};
//! use literature_core::library::LibraryStore;
//! use literature_core::stream::HttpEventSource;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default();
//! let store = LibraryStore::new(
//!     ApiClient::new(&config)?,
//!     Arc::new(HttpEventSource::new(&config)?),
//! );
//! let files = vec![UploadFile::from_path("a.pdf".as_ref()).await?];
//! let outcome = store
//!     .batch_import_literature(&files, Some(|percent| println!("{percent}%")))
//!     .await?;
//! println!("import {} done", outcome.import_id);
//! # Ok(())
//! # }
//! ```

mod error;
mod import;
mod state;
mod store;

pub use error::{LibraryError, Operation};
pub use import::{ImportOptions, ImportOutcome, ImportPhase, progress_percent};
pub use state::{DEFAULT_PAGE_SIZE, FilterUpdate, Filters, ListCacheState};
pub use store::LibraryStore;
