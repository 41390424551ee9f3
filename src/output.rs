//! CLI output formatting helpers.

use literature_core::{ImportOutcome, ListCacheState, Literature};

/// Returns terminal width from COLUMNS, or 80 if unset/invalid.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(80)
}

/// Truncates text to at most `width` chars, appending ellipsis if truncated.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let text_len = text.chars().count();
    if text_len <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    if width == 1 {
        return "…".to_string();
    }

    let mut output: String = text.chars().take(width - 1).collect();
    output.push('…');
    output
}

/// One list row: `id  title  [category]  size`.
pub fn render_literature_row(literature: &Literature, width: usize) -> String {
    let mut row = format!("{:>6}  {}", literature.id, literature.display_title());
    if let Some(category) = literature.category.as_deref().filter(|c| !c.is_empty()) {
        row.push_str(&format!("  [{category}]"));
    }
    let size = literature.file_size_readable();
    if !size.is_empty() {
        row.push_str(&format!("  {size}"));
    }
    truncate_to_width(&row, width)
}

/// Footer under a list page.
pub fn render_page_footer(state: &ListCacheState) -> String {
    let size = u64::from(state.page_size.max(1));
    let pages = state.total_count.div_ceil(size).max(1);
    format!(
        "page {}/{} ({} per page, {} total)",
        state.current_page, pages, state.page_size, state.total_count
    )
}

/// Multi-line detail view of one entry; absent fields are skipped.
pub fn render_detail(literature: &Literature) -> Vec<String> {
    let mut lines = vec![format!("id: {}", literature.id)];
    let fields = [
        ("title", literature.title.as_deref()),
        ("file", literature.original_file_name.as_deref()),
        ("type", literature.file_type.as_deref()),
        ("category", literature.category.as_deref()),
        ("author", literature.author.as_deref()),
        ("tags", literature.tags.as_deref()),
        ("description", literature.description.as_deref()),
        ("reading guide", literature.reading_guide.as_deref()),
        ("created", literature.create_time.as_deref()),
        ("updated", literature.update_time.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            lines.push(format!("{label}: {value}"));
        }
    }
    if let Some(year) = literature.publish_year {
        lines.push(format!("year: {year}"));
    }
    let size = literature.file_size_readable();
    if !size.is_empty() {
        lines.push(format!("size: {size}"));
    }
    lines
}

/// Summary lines for a finished batch import.
pub fn render_import_summary(outcome: &ImportOutcome) -> Vec<String> {
    let mut lines = vec![format!(
        "Import {} finished: {} imported, {} failed",
        outcome.import_id,
        outcome.completed_files.len(),
        outcome.failed_files.len()
    )];
    for failed in &outcome.failed_files {
        lines.push(format!(
            "  failed: {} ({})",
            failed.file_name.as_deref().unwrap_or("<unknown>"),
            failed.reason()
        ));
    }
    lines
}

/// Masks an API key, keeping at most the first three characters.
pub fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "<empty>".to_string();
    }
    let visible: String = key.chars().take(3.min(key.chars().count() / 2)).collect();
    format!("{visible}****")
}
