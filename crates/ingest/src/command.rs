//! COPY command rendering.

/// Renders the warehouse bulk-load statement for a manifest location.
///
/// The format clause is fixed: the batch data is always Parquet behind a
/// manifest.
pub fn render_copy_command(table: &str, manifest_uri: &str, iam_role: &str) -> String {
    format!(
        "COPY {}\nFROM '{}'\nIAM_ROLE '{}'\nFORMAT AS PARQUET\nMANIFEST;",
        table, manifest_uri, iam_role
    )
}
