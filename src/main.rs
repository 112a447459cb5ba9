use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use time::{format_description::well_known, OffsetDateTime};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

use urlscan_rs::backend::HttpBackend;
use urlscan_rs::dashboard::DashboardPage;
use urlscan_rs::push::Correlator;
use urlscan_rs::render::ConsoleSurface;
use urlscan_rs::session::Coordinator;
use urlscan_rs::types::ScanReport;

/// urlscan-rs — scan a URL for phishing risk with live step-by-step progress.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "urlscan-rs",
    version,
    about = "Scan a URL for phishing risk against an analysis service, with live progress.",
    long_about = None
)]
struct Cli {
    /// The URL to scan (scheme optional; http:// is assumed).
    url: String,

    /// Base URL of the analysis service.
    #[arg(long, default_value = "http://127.0.0.1:5000/")]
    backend: Url,

    /// WebSocket endpoint for live progress. Derived from --backend if omitted.
    #[arg(long = "push-endpoint")]
    push_endpoint: Option<String>,

    /// Skip the push channel and scan with a static indicator.
    #[arg(long = "no-push", default_value_t = false)]
    no_push: bool,

    /// Write the settled report as pretty JSON to this path (optional).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Fetch and print the first dashboard page after a successful scan.
    #[arg(long = "show-dashboard", default_value_t = false)]
    show_dashboard: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let push_endpoint = match (&cli.push_endpoint, cli.no_push) {
        (_, true) => None,
        (Some(ep), false) => Some(ep.clone()),
        (None, false) => Some(derive_push_endpoint(&cli.backend)?),
    };

    println!("urlscan-rs configuration:");
    println!("  url          : {}", cli.url);
    println!("  backend      : {}", cli.backend);
    println!(
        "  push         : {}",
        push_endpoint.as_deref().unwrap_or("<disabled>")
    );
    println!(
        "  output       : {}",
        cli.output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string())
    );

    let correlator = match &push_endpoint {
        Some(ep) => Correlator::new(ep.clone()),
        None => Correlator::detached(),
    };
    let backend = HttpBackend::new(cli.backend.clone())?;

    let mut coordinator = Coordinator::new(backend, correlator, ConsoleSurface::new())
        .on_refresh(Box::new(|| debug!("dashboard refresh requested")));

    // The surface has already reported any failure; just set the exit code.
    let outcome = match coordinator.run_scan(&cli.url).await {
        Ok(outcome) => outcome,
        Err(_) => std::process::exit(1),
    };
    println!("\nVerdict: {} (score {})", outcome.tier.label(), outcome.report.risk_score);

    if let Some(path) = cli.output.as_deref() {
        if let Err(e) = write_report_json(path, &cli.url, &outcome.report) {
            eprintln!("Failed to write JSON to {}: {}", path.display(), e);
        } else {
            println!("Wrote JSON report to {}", path.display());
        }
    }

    if cli.show_dashboard {
        let dash = HttpBackend::new(cli.backend.clone())?;
        match dash.dashboard_page(1).await {
            Ok(page) => print_dashboard(&page),
            Err(e) => eprintln!("Failed to fetch dashboard data: {e}"),
        }
    }

    Ok(())
}

/// Map the service base URL onto its push-channel endpoint
/// (`http://host -> ws://host/progress`).
fn derive_push_endpoint(backend: &Url) -> Result<String> {
    let scheme = if backend.scheme() == "https" { "wss" } else { "ws" };
    let host = backend
        .host_str()
        .context("backend URL must have a host")?;
    Ok(match backend.port() {
        Some(port) => format!("{scheme}://{host}:{port}/progress"),
        None => format!("{scheme}://{host}/progress"),
    })
}

fn print_dashboard(page: &DashboardPage) {
    println!(
        "\nDashboard (page {}/{}): {} scans total, {} safe, {} phishing",
        page.current_page,
        page.total_pages,
        page.stats.total_scans,
        page.stats.safe_count,
        page.stats.phishing_count
    );

    let mut url_w = "url".len();
    for scan in &page.scans {
        url_w = url_w.max(scan.url.len().min(60));
    }
    println!(
        "{:<url_w$}  {:>5}  {:<13}  {}",
        "url", "score", "tier", "scanned_at",
        url_w = url_w
    );
    for scan in &page.scans {
        let mut snip = scan.url.clone();
        if snip.len() > 60 {
            snip.truncate(60);
        }
        println!(
            "{:<url_w$}  {:>5}  {:<13}  {}",
            snip,
            scan.risk_score,
            scan.tier().label(),
            scan.scanned_at.as_deref().unwrap_or("-"),
            url_w = url_w
        );
    }

    let (low, moderate, high) = page.tier_counts();
    println!("This page: {low} low / {moderate} moderate / {high} high");
}

#[derive(Serialize)]
struct ReportExport<'a> {
    scanned_at: String,
    target: &'a str,
    report: &'a ScanReport,
}

fn write_report_json(path: &std::path::Path, target: &str, report: &ScanReport) -> Result<()> {
    let file = File::create(path)?;
    let export = ReportExport {
        scanned_at: now_iso_like(),
        target,
        report,
    };
    serde_json::to_writer_pretty(file, &export)?;
    Ok(())
}

fn now_iso_like() -> String {
    // RFC3339 UTC timestamp; falls back to the epoch on formatting failure.
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
