use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::{AppConfig, StoredConfig, config_file_path};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring ticket-outline.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Secrets are stored in the local config file; protect your filesystem accordingly.");
    println!();

    apply_prompt("Row source (sheets/file)", &mut cfg.source, false)?;
    apply_prompt("Google Sheet ID", &mut cfg.sheet_id, false)?;
    apply_prompt("Sheet range (e.g., A:Z or Tickets!A:K)", &mut cfg.sheet_range, false)?;
    apply_prompt("Rows file (JSON array of rows)", &mut cfg.rows_file, false)?;
    apply_prompt("Document sink (markdown/google-docs)", &mut cfg.sink, false)?;
    apply_prompt("Markdown output directory", &mut cfg.output_dir, false)?;
    apply_prompt("Google access token", &mut cfg.google_access_token, true)?;
    apply_prompt(
        "Ticket base URL (e.g., https://company.zendesk.com)",
        &mut cfg.ticket_base_url,
        false,
    )?;
    apply_prompt("Document title", &mut cfg.document_title, false)?;
    apply_prompt("Ticket ID column (zero-based)", &mut cfg.ticket_id_column, false)?;
    apply_prompt("Summary column (zero-based)", &mut cfg.summary_column, false)?;
    apply_prompt(
        "Organization column (zero-based)",
        &mut cfg.organization_column,
        false,
    )?;

    // Reject values that would only fail at generate time.
    AppConfig::from_stored(cfg.clone())?;
    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("Row source: {}", display_value(&cfg.source));
    println!("Sheet ID: {}", display_value(&cfg.sheet_id));
    println!("Sheet range: {}", display_value(&cfg.sheet_range));
    println!("Rows file: {}", display_value(&cfg.rows_file));
    println!("Document sink: {}", display_value(&cfg.sink));
    println!("Output directory: {}", display_value(&cfg.output_dir));
    println!(
        "Google access token: {}",
        mask_secret(&cfg.google_access_token)
    );
    println!("Ticket base URL: {}", display_value(&cfg.ticket_base_url));
    println!("Document title: {}", display_value(&cfg.document_title));
    println!(
        "Columns (id/summary/organization): {}/{}/{}",
        display_value(&cfg.ticket_id_column),
        display_value(&cfg.summary_column),
        display_value(&cfg.organization_column)
    );

    Ok(())
}

fn apply_prompt(field: &str, target: &mut Option<String>, secret: bool) -> AppResult<()> {
    match prompt(field, target.as_deref(), secret)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn prompt(field: &str, current: Option<&str>, secret: bool) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    match (current, secret) {
        (Some(_), true) => write!(stdout, "{field} [****] (Enter to keep, '-' to clear): ")?,
        (Some(value), false) => {
            write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?
        }
        (None, _) => write!(stdout, "{field} (Enter to skip): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(parse_answer(&input))
}

fn parse_answer(input: &str) -> PromptAction {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        PromptAction::Keep
    } else if trimmed == "-" {
        PromptAction::Clear
    } else {
        PromptAction::Set(trimmed.to_string())
    }
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars: Vec<char> = token.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[derive(Debug, PartialEq)]
enum PromptAction {
    Keep,
    Clear,
    Set(String),
}
