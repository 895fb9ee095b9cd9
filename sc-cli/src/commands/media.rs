//! Gallery media commands.

use std::path::PathBuf;
use std::time::Duration;

use clap::Subcommand;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use sc_core::config::ConfigHandle;
use sc_core::error::{ScError, ScResult};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum MediaAction {
    /// List gallery items, newest first.
    List,
    /// Upload an image file to the gallery.
    Upload {
        /// Path to the file.
        file: PathBuf,
    },
    /// Delete a gallery item and its stored image.
    Delete {
        /// Media item id.
        id: String,
        /// Public image URL of the item.
        image_url: String,
    },
}

pub async fn run(config: ConfigHandle, action: MediaAction, format: OutputFormat) -> ScResult<()> {
    let service = super::open_service(&config).await?;

    match action {
        MediaAction::List => {
            let items = service.list_media_items().await?;
            match format {
                OutputFormat::Json => super::print_json(&items)?,
                OutputFormat::Text => {
                    if items.is_empty() {
                        println!("No media items found.");
                    } else {
                        let mut table = super::new_table(vec!["ID", "Image URL", "Created"]);
                        for item in &items {
                            table.add_row(vec![
                                item.id.clone(),
                                item.image_ref.clone(),
                                super::format_timestamp(&item.created_at),
                            ]);
                        }
                        println!("{table}");
                        println!("\n{} item(s)", items.len());
                    }
                }
            }
        }
        MediaAction::Upload { file } => {
            let content = tokio::fs::read(&file).await?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| ScError::Validation(format!("not a file path: {}", file.display())))?
                .to_string();

            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("  Uploading {spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(format!("{file_name} ({} bytes)", content.len()));
            pb.enable_steady_tick(Duration::from_millis(100));

            let result = service.upload_media_item(content, &file_name).await;
            pb.finish_and_clear();
            report_reconciliation(&service);
            let item = result?;

            match format {
                OutputFormat::Json => super::print_json(&item)?,
                OutputFormat::Text => {
                    println!(
                        "{} Uploaded {file_name} as item {}",
                        style("OK").green().bold(),
                        style(&item.id).bold()
                    );
                    println!("  URL: {}", item.image_ref);
                }
            }
        }
        MediaAction::Delete { id, image_url } => {
            let result = service.delete_media_item(&id, &image_url).await;
            report_reconciliation(&service);
            result?;
            match format {
                OutputFormat::Json => super::print_json(&serde_json::json!({ "deleted": id }))?,
                OutputFormat::Text => {
                    println!("{} Deleted media item {id}", style("OK").green().bold());
                }
            }
        }
    }

    super::save_session(&config, &service).await
}

/// Tell the operator about anything that now needs manual cleanup.
fn report_reconciliation(service: &sc_services::DataService) {
    for record in service.reconciliation().pending() {
        eprintln!(
            "{} needs manual cleanup: {}",
            style("WARN").yellow().bold(),
            record.entry
        );
    }
}
