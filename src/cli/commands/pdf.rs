//! Combined application PDF command.

use super::{open_vault, print_json};
use crate::cli::{Cli, PdfArgs};
use crate::client::SharedVault;
use crate::config::pdf_api_endpoint;
use crate::error::{Error, Result};
use crate::files::{format_file_size, is_pdf_mime, mime_type_for_path, read_file_as_blob};
use crate::pdf::HttpPdfMerger;
use serde::Serialize;
use std::fs;

#[derive(Serialize)]
struct PdfOutput {
    path: String,
    size: usize,
    documents: usize,
}

/// Combine the base PDF with stored documents and write the result.
///
/// # Errors
///
/// Returns an error if the base file is not a readable PDF, the store cannot
/// be opened, or the combination service fails.
pub fn execute(args: &PdfArgs, cli: &Cli, json: bool) -> Result<()> {
    if !is_pdf_mime(mime_type_for_path(&args.base)) {
        return Err(Error::validation(
            "base",
            format!("{} is not a PDF", args.base.display()),
        ));
    }
    let base = read_file_as_blob(&args.base)?;
    let vault = SharedVault::new(open_vault(cli)?);
    let merger = HttpPdfMerger::new(args.endpoint.clone().unwrap_or_else(pdf_api_endpoint));

    // Create tokio runtime for the HTTP round trip
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Background(format!("Failed to create async runtime: {e}")))?;
    let merged = rt.block_on(vault.build_combined_pdf(
        &merger,
        base.data,
        args.documents.clone(),
        &args.token,
    ))?;

    fs::write(&args.out, &merged)?;

    if json {
        return print_json(&PdfOutput {
            path: args.out.display().to_string(),
            size: merged.len(),
            documents: args.documents.len(),
        });
    }

    println!(
        "Wrote {} ({})",
        args.out.display(),
        format_file_size(merged.len() as u64)
    );
    Ok(())
}
