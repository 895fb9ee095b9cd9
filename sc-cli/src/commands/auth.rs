//! Administrator session commands.

use clap::Subcommand;
use console::style;
use dialoguer::{Input, Password};
use tracing::info;

use sc_core::config::ConfigHandle;
use sc_core::error::ScResult;
use sc_services::{AuthEventKind, Service};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in as administrator. The password is always prompted for.
    Login {
        /// Account email (prompted if omitted).
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Sign out and forget the saved session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Keep the session fresh and print auth events until Ctrl-C.
    Watch,
}

pub async fn run(config: ConfigHandle, action: AuthAction, format: OutputFormat) -> ScResult<()> {
    let mut service = super::open_service(&config).await?;

    match action {
        AuthAction::Login { email } => {
            let email = match email {
                Some(e) => e,
                None => Input::new()
                    .with_prompt("Email")
                    .interact_text()
                    .map_err(super::prompt_error)?,
            };
            let password = Password::new()
                .with_prompt("Password")
                .interact()
                .map_err(super::prompt_error)?;

            let session = service.sign_in(&email, &password).await?;
            super::save_session(&config, &service).await?;

            match format {
                OutputFormat::Json => super::print_json(&session.user)?,
                OutputFormat::Text => {
                    println!(
                        "{} Signed in as {}",
                        style("OK").green().bold(),
                        session.user.email.as_deref().unwrap_or(&session.user.id)
                    );
                    if let Some(expires_at) = session.expires_at {
                        println!("  Session expires {}", super::format_timestamp(&expires_at));
                    }
                }
            }
        }
        AuthAction::Logout => {
            let had_session = service.session().is_some();
            service.sign_out().await;
            super::save_session(&config, &service).await?;
            match format {
                OutputFormat::Json => {
                    super::print_json(&serde_json::json!({ "signed_out": had_session }))?;
                }
                OutputFormat::Text if had_session => {
                    println!("{} Signed out.", style("OK").green().bold());
                }
                OutputFormat::Text => println!("Not signed in."),
            }
        }
        AuthAction::Whoami => {
            let user = service.current_user().await?;
            super::save_session(&config, &service).await?;
            match (format, user) {
                (OutputFormat::Json, user) => super::print_json(&user)?,
                (OutputFormat::Text, Some(user)) => {
                    println!("{}", style("Signed in").bold().underlined());
                    println!("  ID:    {}", user.id);
                    println!("  Email: {}", user.email.as_deref().unwrap_or("-"));
                    println!("  Role:  {}", user.role.as_deref().unwrap_or("-"));
                    if let Some(last) = user.last_sign_in_at {
                        println!("  Last sign-in: {}", super::format_timestamp(&last));
                    }
                }
                (OutputFormat::Text, None) => println!("Not signed in."),
            }
        }
        AuthAction::Watch => {
            let subscription = service.subscribe_auth_state(move |kind, session| {
                let user = session.as_ref().map(|s| s.user.id.clone());
                match format {
                    OutputFormat::Json => println!(
                        "{}",
                        serde_json::json!({ "event": kind.as_str(), "user": user })
                    ),
                    OutputFormat::Text => {
                        let label = match kind {
                            AuthEventKind::SessionExpired | AuthEventKind::SignedOut => {
                                style(kind.as_str()).yellow().bold()
                            }
                            _ => style(kind.as_str()).green().bold(),
                        };
                        println!("{label} {}", user.as_deref().unwrap_or("-"));
                    }
                }
            });

            service.init()?;
            info!("watching session, press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;

            subscription.unsubscribe().await;
            service.shutdown()?;
            super::save_session(&config, &service).await?;
        }
    }

    Ok(())
}
