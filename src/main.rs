//! # Campus Newsletter
//!
//! Command-line front end of the newsletter compiler. Each subcommand
//! resolves an issue week, assembles the bundle from the Campus Life Events
//! API, renders it once, and hands the result to one sink:
//!
//! - `render`: write `campus-life-newsletter-<date>.html` (and optionally `.txt`)
//! - `copy`: place HTML and plain text on the system clipboard
//! - `preview`: send the HTML as a preview mail through the API
//! - `watch`: fetch once, then re-render on every edit of the custom-text file
//!
//! ## Usage
//!
//! ```sh
//! campus_newsletter render --year 2025 --week 42 -o ./out
//! ```

use campus_newsletter::api::{ApiClient, RetryFetch};
use campus_newsletter::bundle::assemble_bundle;
use campus_newsletter::config::Settings;
use campus_newsletter::debounce::Debouncer;
use campus_newsletter::outputs::clipboard::{SystemClipboard, copy_to_clipboard};
use campus_newsletter::outputs::download::FileSink;
use campus_newsletter::outputs::preview::send_preview;
use campus_newsletter::utils::{non_blank, truncate_for_log};
use campus_newsletter::week::resolve_window;
use campus_newsletter::{render_document, render_newsletter_document};
use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command, IssueArgs, OutputArgs, read_custom_text};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "campus_newsletter starting up");

    let args = Cli::parse();
    debug!(command = ?args.command, "Parsed CLI arguments");

    let settings = match args.load_settings().await {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    info!(
        api = %settings.api_base_url,
        timezone = %settings.display_timezone,
        target = %settings.render_target,
        authenticated = settings.session_token.is_some(),
        "Configuration ready"
    );

    let client = ApiClient::new(&settings.api_base_url, settings.session_token.as_deref())?;
    let source = RetryFetch::new(client, settings.retry.max_retries, settings.retry.base_delay());

    let result = match &args.command {
        Command::Render { issue, output } => run_render(issue, output, &settings, &source).await,
        Command::Copy { issue } => run_copy(issue, &settings, &source).await,
        Command::Preview { issue } => run_preview(issue, &settings, &source).await,
        Command::Watch {
            issue,
            output,
            poll_ms,
        } => run_watch(issue, output, *poll_ms, &settings, &source).await,
    };

    let elapsed = start_time.elapsed();
    match result {
        Ok(()) => {
            info!(elapsed_ms = elapsed.as_millis() as u64, "Done");
            Ok(())
        }
        Err(e) => {
            error!(elapsed_ms = elapsed.as_millis() as u64, error = %e, "Failed");
            Err(e)
        }
    }
}

type Source = RetryFetch<ApiClient>;

#[instrument(level = "info", skip_all)]
async fn run_render(
    issue: &IssueArgs,
    output: &OutputArgs,
    settings: &Settings,
    source: &Source,
) -> Result<(), Box<dyn Error>> {
    let sink = FileSink::new(&output.output_dir, settings.display_timezone)
        .with_plain_text(output.plain_text);
    // Fail before hitting the API when the output cannot be written.
    campus_newsletter::utils::ensure_writable_dir(sink.output_dir()).await?;

    let selector = issue.selector(Utc::now(), settings.display_timezone)?;
    let custom_text = issue.custom_text().await?;
    let doc = render_newsletter_document(
        selector,
        custom_text.as_deref(),
        settings,
        source,
        source,
        Utc::now(),
    )
    .await?;

    let receipt = sink.write(&doc).await?;
    info!(path = %receipt.location, mime = receipt.mime_type, bytes = receipt.bytes, "Newsletter written");
    println!("{}", receipt.location);
    Ok(())
}

#[instrument(level = "info", skip_all)]
async fn run_copy(issue: &IssueArgs, settings: &Settings, source: &Source) -> Result<(), Box<dyn Error>> {
    let selector = issue.selector(Utc::now(), settings.display_timezone)?;
    let custom_text = issue.custom_text().await?;
    let doc = render_newsletter_document(
        selector,
        custom_text.as_deref(),
        settings,
        source,
        source,
        Utc::now(),
    )
    .await?;

    let mut clipboard = SystemClipboard::new();
    match copy_to_clipboard(&mut clipboard, &doc) {
        Ok(receipt) => {
            info!(formats = %receipt.location, bytes = receipt.bytes, "Copied to clipboard");
            // Clipboard managers on X11/Wayland take a moment to pick the contents up.
            tokio::time::sleep(Duration::from_millis(250)).await;
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Clipboard unavailable; printing plain text instead");
            println!("{}", doc.plain_text);
            Err(e.into())
        }
    }
}

#[instrument(level = "info", skip_all)]
async fn run_preview(issue: &IssueArgs, settings: &Settings, source: &Source) -> Result<(), Box<dyn Error>> {
    let selector = issue.selector(Utc::now(), settings.display_timezone)?;
    let custom_text = issue.custom_text().await?;
    let doc = render_newsletter_document(
        selector,
        custom_text.as_deref(),
        settings,
        source,
        source,
        Utc::now(),
    )
    .await?;

    let receipt = send_preview(source, &doc).await?;
    info!(subject = %receipt.location, bytes = receipt.bytes, "Preview dispatched");
    Ok(())
}

/// Fetch the bundle once, then re-render on every change of the custom-text
/// file. Runs until Ctrl-C.
#[instrument(level = "info", skip_all)]
async fn run_watch(
    issue: &IssueArgs,
    output: &OutputArgs,
    poll_ms: u64,
    settings: &Settings,
    source: &Source,
) -> Result<(), Box<dyn Error>> {
    let Some(text_path) = issue.custom_text_file.clone() else {
        return Err("watch needs --custom-text-file".into());
    };

    let sink = FileSink::new(&output.output_dir, settings.display_timezone)
        .with_plain_text(output.plain_text);
    campus_newsletter::utils::ensure_writable_dir(sink.output_dir()).await?;

    let now = Utc::now();
    let window = resolve_window(issue.selector(now, settings.display_timezone)?, now, settings.display_timezone)?;
    let bundle = Arc::new(assemble_bundle(&window, source, source, settings).await?);
    let options = settings.render_options();

    let mut debouncer = Debouncer::new(settings.debounce(), move |text: String| {
        let bundle = Arc::clone(&bundle);
        let options = options.clone();
        async move { render_document(&bundle, non_blank(Some(text.as_str())), &options) }
    });
    let mut rendered = debouncer.subscribe();

    let mut last_text = read_text_or_warn(&text_path).await;
    debouncer.submit(last_text.clone().unwrap_or_default());

    let mut ticker = tokio::time::interval(Duration::from_millis(poll_ms.max(50)));
    info!(file = %text_path.display(), "Watching for changes (Ctrl-C to stop)");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let text = read_text_or_warn(&text_path).await;
                if text.is_some() && text != last_text {
                    debug!(preview = %truncate_for_log(text.as_deref().unwrap_or_default(), 80), "Custom text changed");
                    let generation = debouncer.submit(text.clone().unwrap_or_default());
                    debug!(generation, "Scheduled re-render");
                    last_text = text;
                }
            }
            changed = rendered.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = rendered.borrow_and_update().clone();
                if let Some(published) = latest {
                    match sink.write(&published.value).await {
                        Ok(receipt) => info!(generation = published.generation, path = %receipt.location, "Re-rendered"),
                        Err(e) => warn!(generation = published.generation, error = %e, "Write failed; will retry on next change"),
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch");
                break;
            }
        }
    }
    Ok(())
}

/// Read the custom-text file, logging (not failing) when it is unreadable.
async fn read_text_or_warn(path: &Path) -> Option<String> {
    match read_custom_text(path).await {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(error = %e, "Cannot read custom-text file");
            None
        }
    }
}
