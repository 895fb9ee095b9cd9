//! Configuration commands.

use std::path::Path;

use clap::Subcommand;
use console::style;
use dialoguer::Input;

use sc_core::config::{AppConfig, ConfigHandle};
use sc_core::error::{ScError, ScResult};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration. The anon key is masked.
    Show,
    /// Write a configuration file with the backend endpoint and key.
    Init {
        /// Backend project URL (prompted if omitted).
        #[arg(long)]
        url: Option<String>,
        /// Public anon key (prompted if omitted).
        #[arg(long)]
        anon_key: Option<String>,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(
    config: ConfigHandle,
    path: &Path,
    action: ConfigAction,
    format: OutputFormat,
) -> ScResult<()> {
    match action {
        ConfigAction::Show => {
            let mut shown = config.read().await.clone();
            shown.backend.anon_key = mask_key(&shown.backend.anon_key);
            match format {
                OutputFormat::Json => super::print_json(&shown)?,
                OutputFormat::Text => {
                    let text = toml::to_string_pretty(&shown)
                        .map_err(|e| ScError::Config(format!("failed to serialize config: {e}")))?;
                    println!("{} {}", style("#").dim(), style(path.display()).dim());
                    println!("{text}");
                }
            }
        }
        ConfigAction::Init { url, anon_key, force } => {
            if path.exists() && !force {
                return Err(ScError::Config(format!(
                    "{} already exists, pass --force to overwrite",
                    path.display()
                )));
            }

            let url = match url {
                Some(u) => u,
                None => Input::new()
                    .with_prompt("Backend URL")
                    .interact_text()
                    .map_err(super::prompt_error)?,
            };
            let anon_key = match anon_key {
                Some(k) => k,
                None => Input::new()
                    .with_prompt("Anon key")
                    .interact_text()
                    .map_err(super::prompt_error)?,
            };

            {
                let mut cfg = config.write().await;
                apply_backend(&mut cfg, &url, &anon_key);
                cfg.require_backend()?;
                cfg.save_to_file(path)?;
            }
            println!("{} Config saved to {}", style("OK").green(), path.display());
        }
    }
    Ok(())
}

fn apply_backend(cfg: &mut AppConfig, url: &str, anon_key: &str) {
    cfg.backend.url = AppConfig::sanitize_backend_url(url);
    cfg.backend.anon_key = anon_key.trim().to_string();
}

/// Keep the first and last four characters of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
