//! Library command handlers: list, detail, delete, upload, download.

use std::path::Path;

use anyhow::{Context, Result};
use literature_core::{FilterUpdate, LibraryStore, UploadFile};
use tracing::info;

use crate::cli::ListArgs;
use crate::output::{
    render_detail, render_literature_row, render_page_footer, terminal_width,
};

pub async fn run_list_command(store: &LibraryStore, args: &ListArgs, default_size: u32) -> Result<()> {
    store.set_search_params(FilterUpdate {
        category: args.category.clone(),
        description: args.description.clone(),
        reading_guide: args.reading_guide.clone(),
        tags: args.tags.clone(),
    });
    let size = args.size.unwrap_or(default_size);
    store
        .fetch_list(args.page, size)
        .await
        .context("Failed to list documents")?;

    let state = store.snapshot();
    if state.records.is_empty() {
        println!("No documents found.");
    }
    let width = terminal_width();
    for literature in &state.records {
        println!("{}", render_literature_row(literature, width));
    }
    println!("{}", render_page_footer(&state));
    Ok(())
}

pub async fn run_detail_command(store: &LibraryStore, id: i64) -> Result<()> {
    let literature = store
        .get_detail(id)
        .await
        .with_context(|| format!("Failed to load document {id}"))?;
    for line in render_detail(&literature) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_delete_command(store: &LibraryStore, id: i64) -> Result<()> {
    store
        .delete_one(id)
        .await
        .with_context(|| format!("Failed to delete document {id}"))?;
    info!(id, "Deleted document");
    Ok(())
}

pub async fn run_upload_command(store: &LibraryStore, path: &Path) -> Result<()> {
    let file = UploadFile::from_path(path)
        .await
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    let literature = store
        .upload_one(&file)
        .await
        .with_context(|| format!("Failed to upload '{}'", path.display()))?;
    println!("Uploaded {} as #{}", file.file_name, literature.id);
    Ok(())
}

pub async fn run_download_command(store: &LibraryStore, id: i64, output_dir: &Path) -> Result<()> {
    let path = store
        .download_one(id, output_dir)
        .await
        .with_context(|| format!("Failed to download document {id}"))?;
    println!("Saved {}", path.display());
    Ok(())
}
