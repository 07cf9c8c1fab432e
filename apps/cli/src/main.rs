use std::{fs, io::Read, sync::Arc};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use client_core::{
    ConversionClient, FilePreferenceStore, HistoryFilter, HttpConversionApi, NoticeSeverity,
    ThemeController,
};
use shared::{domain::ThemeMode, protocol::ConversionRecord};

mod config;

#[derive(Parser, Debug)]
#[command(name = "php2node", about = "PHP to Node.js conversion client")]
struct Cli {
    /// Conversion service base URL (overrides converter.toml and env).
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a PHP source file ("-" reads stdin) and print the Node.js output.
    Convert {
        input: String,
        /// Also place the converted code on the system clipboard.
        #[arg(long)]
        copy: bool,
    },
    /// List past conversions with optional search and date filters.
    History {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        /// Inclusive lower bound, YYYY-MM-DD.
        #[arg(long)]
        from: Option<String>,
        /// Inclusive upper bound, YYYY-MM-DD.
        #[arg(long)]
        to: Option<String>,
    },
    /// Show a single conversion record by id.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Read or change the persisted UI theme.
    Theme {
        #[command(subcommand)]
        action: ThemeCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ThemeCommand {
    /// Print the active theme mode.
    Get,
    /// Switch between light and dark and persist the result.
    Toggle,
    /// Set an explicit mode (light or dark).
    Set { mode: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();
    let settings = config::load_settings();
    let server_url = cli.server_url.unwrap_or_else(|| settings.server_url.clone());

    match cli.command {
        Command::Convert { input, copy } => run_convert(&server_url, &input, copy).await,
        Command::History {
            page,
            limit,
            search,
            from,
            to,
        } => {
            run_history(
                &server_url,
                page,
                limit.unwrap_or(settings.history_limit),
                search,
                from,
                to,
            )
            .await
        }
        Command::Show { id, json } => run_show(&server_url, &id, json).await,
        Command::Theme { action } => run_theme(&settings, action),
    }
}

fn new_client(server_url: &str) -> Result<Arc<ConversionClient>> {
    let api = HttpConversionApi::new(server_url)?;
    Ok(ConversionClient::new(Arc::new(api)))
}

async fn run_convert(server_url: &str, input: &str, copy: bool) -> Result<()> {
    let source = read_source(input)?;
    let client = new_client(server_url)?;

    client.set_input_code(source.clone()).await;
    client.submit_conversion(&source).await;

    let current = client.snapshot().await.current;
    if let Some(error) = current.error {
        bail!("conversion failed: {error}");
    }
    if current.output_code.is_empty() {
        bail!("conversion produced no output (was the input empty?)");
    }
    println!("{}", current.output_code);

    if copy {
        match copy_to_clipboard(&current.output_code) {
            Ok(()) => {
                client
                    .publish_notice("Code copied to clipboard!", NoticeSeverity::Success)
                    .await;
            }
            Err(err) => {
                tracing::warn!("clipboard copy failed: {err:#}");
                client
                    .publish_notice("Failed to copy code.", NoticeSeverity::Error)
                    .await;
            }
        }
        if let Some(notice) = client.notice().await {
            eprintln!("{}", notice.message);
        }
    }

    Ok(())
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("no clipboard available")?;
    clipboard
        .set_text(text.to_string())
        .context("failed to write clipboard")?;
    Ok(())
}

async fn run_history(
    server_url: &str,
    page: u32,
    limit: u32,
    search: Option<String>,
    from: Option<String>,
    to: Option<String>,
) -> Result<()> {
    let mut filter = HistoryFilter::default();
    filter.set_limit(limit);
    if let Some(search) = search {
        filter.set_search(search);
    }
    if let Some(from) = from {
        filter.set_date_from(Some(parse_day(&from, false)?));
    }
    if let Some(to) = to {
        filter.set_date_to(Some(parse_day(&to, true)?));
    }
    // Page last: every filter setter above jumps back to page 1.
    filter.set_page(page);

    let client = new_client(server_url)?;
    client.load_history(filter.to_query()).await;

    let history = client.snapshot().await.history;
    if let Some(error) = history.error {
        bail!("history fetch failed: {error}");
    }

    if history.items.is_empty() {
        println!("no conversions found");
        return Ok(());
    }

    for record in &history.items {
        println!(
            "{:<12} {:<20} {:<8} {}",
            record.id,
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.status.as_str(),
            preview(&record.original_code),
        );
    }
    println!(
        "page {}/{} ({} conversions)",
        history.page, history.total_pages, history.total
    );

    Ok(())
}

async fn run_show(server_url: &str, id: &str, json: bool) -> Result<()> {
    let client = new_client(server_url)?;
    let record = client
        .fetch_record(id)
        .await
        .with_context(|| format!("failed to fetch conversion '{id}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    print_record(&record);
    Ok(())
}

fn print_record(record: &ConversionRecord) {
    println!("id:        {}", record.id);
    println!("timestamp: {}", record.timestamp.to_rfc3339());
    println!("status:    {}", record.status.as_str());
    if let Some(message) = &record.error_message {
        println!("error:     {message}");
    }
    println!("--- PHP ---");
    println!("{}", record.original_code);
    println!("--- Node.js ---");
    println!("{}", record.converted_code);
}

fn run_theme(settings: &config::Settings, action: ThemeCommand) -> Result<()> {
    let store = Arc::new(FilePreferenceStore::new(settings.theme_file.clone()));
    let mut controller = ThemeController::load_or_default(store);

    match action {
        ThemeCommand::Get => println!("{}", controller.mode().as_str()),
        ThemeCommand::Toggle => {
            let mode = controller.toggle().context("failed to persist theme")?;
            println!("{}", mode.as_str());
        }
        ThemeCommand::Set { mode } => {
            let mode = parse_theme_mode(&mode)?;
            controller.set(mode).context("failed to persist theme")?;
            println!("{}", mode.as_str());
        }
    }

    Ok(())
}

fn parse_theme_mode(raw: &str) -> Result<ThemeMode> {
    if raw.eq_ignore_ascii_case("light") {
        Ok(ThemeMode::Light)
    } else if raw.eq_ignore_ascii_case("dark") {
        Ok(ThemeMode::Dark)
    } else {
        bail!("unknown theme mode '{raw}' (expected light or dark)");
    }
}

fn read_source(input: &str) -> Result<String> {
    if input == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("failed to read stdin")?;
        Ok(source)
    } else {
        fs::read_to_string(input).with_context(|| format!("failed to read '{input}'"))
    }
}

/// Bounds the day string into an inclusive range endpoint.
fn parse_day(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{raw}' (expected YYYY-MM-DD)"))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    }
    .context("invalid time of day")?;
    Ok(time.and_utc())
}

fn preview(code: &str) -> String {
    let line = code.lines().next().unwrap_or("").trim();
    let mut shortened: String = line.chars().take(48).collect();
    if line.chars().count() > 48 {
        shortened.push_str("...");
    }
    shortened
}
