//! Offering commands.

use clap::Subcommand;
use console::style;

use sc_core::config::ConfigHandle;
use sc_core::error::{ScError, ScResult};
use sc_models::{Offering, OfferingFields};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum OfferingsAction {
    /// List all offerings, newest first.
    List,
    /// Create an offering (requires sign-in).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Display price, e.g. "$50" or "from $120".
        #[arg(long)]
        price: String,
        /// Public image URL.
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Update an offering. Omitted fields keep their current value.
    Update {
        /// Offering id.
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<String>,
        /// Public image URL; pass an empty string to remove it.
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Delete an offering.
    Delete {
        /// Offering id.
        id: String,
    },
}

pub async fn run(config: ConfigHandle, action: OfferingsAction, format: OutputFormat) -> ScResult<()> {
    let service = super::open_service(&config).await?;

    match action {
        OfferingsAction::List => {
            let offerings = service.list_offerings().await?;
            match format {
                OutputFormat::Json => super::print_json(&offerings)?,
                OutputFormat::Text => print_table(&offerings),
            }
        }
        OfferingsAction::Create { title, description, price, image_url } => {
            let fields = OfferingFields::new(title, description, price, image_url);
            let offering = service.create_offering(fields).await?;
            print_saved("Created", &offering, format)?;
        }
        OfferingsAction::Update { id, title, description, price, image_url } => {
            let current = service
                .list_offerings()
                .await?
                .into_iter()
                .find(|o| o.id == id)
                .ok_or_else(|| ScError::NotFound(format!("offering {id}")))?;

            let fields = OfferingFields::new(
                title.unwrap_or(current.title),
                description.unwrap_or(current.description),
                price.unwrap_or(current.price),
                image_url.or(current.image_ref),
            );
            let offering = service.update_offering(&id, fields).await?;
            print_saved("Updated", &offering, format)?;
        }
        OfferingsAction::Delete { id } => {
            service.delete_offering(&id).await?;
            match format {
                OutputFormat::Json => {
                    super::print_json(&serde_json::json!({ "deleted": id }))?;
                }
                OutputFormat::Text => {
                    println!("{} Deleted offering {id}", style("OK").green().bold());
                }
            }
        }
    }

    super::save_session(&config, &service).await
}

fn print_table(offerings: &[Offering]) {
    if offerings.is_empty() {
        println!("No offerings found.");
        return;
    }

    let mut table = super::new_table(vec!["ID", "Title", "Price", "Description", "Image", "Created"]);
    for o in offerings {
        table.add_row(vec![
            o.id.clone(),
            super::truncate(&o.title, 30),
            o.price_label().to_string(),
            super::truncate(&o.description, 40),
            if o.image_ref.is_some() { "yes".to_string() } else { "-".to_string() },
            super::format_timestamp(&o.created_at),
        ]);
    }
    println!("{table}");
    println!("\n{} offering(s)", offerings.len());
}

fn print_saved(verb: &str, offering: &Offering, format: OutputFormat) -> ScResult<()> {
    match format {
        OutputFormat::Json => super::print_json(offering),
        OutputFormat::Text => {
            println!(
                "{} {verb} offering {} ({})",
                style("OK").green().bold(),
                style(&offering.id).bold(),
                offering.title
            );
            Ok(())
        }
    }
}
