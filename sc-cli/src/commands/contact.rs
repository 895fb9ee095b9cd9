//! Contact message commands.

use clap::Subcommand;
use console::style;

use sc_core::config::ConfigHandle;
use sc_core::error::ScResult;
use sc_models::ContactFields;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ContactAction {
    /// Submit a contact message, as the site's contact form does.
    Send {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
    /// List received messages, newest first (requires sign-in).
    List,
}

pub async fn run(config: ConfigHandle, action: ContactAction, format: OutputFormat) -> ScResult<()> {
    let service = super::open_service(&config).await?;

    match action {
        ContactAction::Send { name, email, message } => {
            service
                .create_contact_message(ContactFields::new(name, email, message))
                .await?;
            match format {
                OutputFormat::Json => super::print_json(&serde_json::json!({ "sent": true }))?,
                OutputFormat::Text => println!("{} Message sent.", style("OK").green().bold()),
            }
        }
        ContactAction::List => {
            let messages = service.list_contact_messages().await?;
            match format {
                OutputFormat::Json => super::print_json(&messages)?,
                OutputFormat::Text => {
                    if messages.is_empty() {
                        println!("No contact messages.");
                    } else {
                        let mut table = super::new_table(vec!["Received", "Name", "Email", "Message"]);
                        for m in &messages {
                            table.add_row(vec![
                                super::format_timestamp(&m.created_at),
                                super::truncate(&m.name, 24),
                                m.email.clone(),
                                super::truncate(&m.message, 60),
                            ]);
                        }
                        println!("{table}");
                        println!("\n{} message(s)", messages.len());
                    }
                }
            }
        }
    }

    super::save_session(&config, &service).await
}
