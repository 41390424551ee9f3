//! HTTP collaborator for the remote literature service.
//!
//! This module wraps the service's REST endpoints:
//!
//! - `GET /literature/list` - paginated, filterable listing
//! - `POST /literature/upload` - single-file multipart upload
//! - `POST /literature/batch-import` - multi-file import job submission
//! - `GET /literature/download/{id}` - original file, named by `Content-Disposition`
//! - `GET /literature/{id}` / `DELETE /literature/{id}` - detail and removal
//!
//! Responses may arrive wrapped in the service's `{code, message, data}`
//! envelope or bare; both decode the same way.
//!
//! # Example
//!
//! ```no_run
//! use literature_core::api::{ApiClient, ClientConfig, ListQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(&ClientConfig::with_base_url("http://localhost:8081"))?;
//! let page = client
//!     .list(&ListQuery { page: 1, size: 10, ..ListQuery::default() })
//!     .await?;
//! println!("{} documents", page.total);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
pub mod filename;
mod model;

pub use client::{ApiClient, ClientConfig};
pub use error::ApiError;
pub use model::{
    DownloadedFile, ImportTicket, ListQuery, Literature, LiteraturePage, UploadFile,
};
