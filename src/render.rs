use indicatif::{ProgressBar, ProgressStyle};

use crate::types::ScanReport;

/// Placeholder shown for any field the backend omitted. Panels must never
/// render an empty cell.
pub const PLACEHOLDER: &str = "Unknown";

/// `value` if present and non-empty, the placeholder otherwise.
pub fn text_or_unknown(value: &Option<String>) -> &str {
    value
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(PLACEHOLDER)
}

/// The independent result panels, in the order they cascade in after a
/// scan settles. The order is a UX policy, not a data dependency: every
/// panel receives the same report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    RiskAssessment,
    KeyIndicators,
    DatabaseComparison,
    TechnicalReport,
    CommunityReports,
}

impl Panel {
    pub const REVEAL_ORDER: [Panel; 5] = [
        Panel::RiskAssessment,
        Panel::KeyIndicators,
        Panel::DatabaseComparison,
        Panel::TechnicalReport,
        Panel::CommunityReports,
    ];
}

/// Everything the coordinator needs from the surrounding UI. The real page
/// wiring lives outside this crate; the coordinator only drives this seam.
///
/// Contract: after any scan, successful or not, `scan_finished` re-enables
/// the trigger control — no failure path may leave it disabled or leave the
/// progress indicator visible.
pub trait RenderSurface {
    /// Input validation failed; nothing was sent.
    fn invalid_input(&mut self, message: &str);

    /// A scan was issued: disable the trigger and show the indicator.
    fn scan_started(&mut self);

    /// Progress display update: current percentage and step label.
    fn progress(&mut self, percent: u8, label: &str);

    /// Reveal one result panel with the settled report.
    fn reveal_panel(&mut self, panel: Panel, report: &ScanReport);

    /// The scan failed after being issued: hide the indicator and surface
    /// the error. No panel may be revealed.
    fn scan_failed(&mut self, message: &str);

    /// Terminal bookkeeping for every outcome: re-enable the trigger.
    fn scan_finished(&mut self);
}

/// Terminal renderer used by the CLI: an indicatif bar while the scan runs,
/// then the report sections printed as plain tables.
pub struct ConsoleSurface {
    bar: Option<ProgressBar>,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self { bar: None }
    }

    fn clear_bar(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Default for ConsoleSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for ConsoleSurface {
    fn invalid_input(&mut self, message: &str) {
        eprintln!("Invalid input: {message}");
    }

    fn scan_started(&mut self) {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message("Scanning...");
        self.bar = Some(bar);
    }

    fn progress(&mut self, percent: u8, label: &str) {
        if let Some(bar) = &self.bar {
            bar.set_position(u64::from(percent));
            if !label.is_empty() {
                bar.set_message(label.to_string());
            }
        }
    }

    fn reveal_panel(&mut self, panel: Panel, report: &ScanReport) {
        self.clear_bar();
        match panel {
            Panel::RiskAssessment => {
                let tier = report.tier();
                println!("\n== Risk Assessment ==");
                println!("{} ({}%)", tier.headline(), report.risk_score);
                println!("{}", tier.verdict());
            }
            Panel::KeyIndicators => {
                println!("\n== Key Indicators ==");
                let ssl = &report.ssl_certificate;
                println!(
                    "SSL certificate : {} ({})",
                    if ssl.valid { "Valid" } else { "Invalid" },
                    ssl.details.as_deref().unwrap_or("No issues detected")
                );
                println!(
                    "Domain          : {} (age: {} days)",
                    text_or_unknown(&report.domain_age.status),
                    report.domain_age.age_days
                );
                let kw = &report.keywords;
                let found = if kw.keywords_found.is_empty() {
                    "No suspicious keywords found".to_string()
                } else {
                    kw.keywords_found.join(", ")
                };
                println!(
                    "Keywords        : {} ({})",
                    if kw.detected { "Detected" } else { "Not Detected" },
                    found
                );
            }
            Panel::DatabaseComparison => {
                println!("\n== Threat Databases ==");
                let mut name_w = "database".len();
                for db in &report.threat_databases {
                    name_w = name_w.max(text_or_unknown(&db.name).len());
                }
                println!("{:<name_w$}  status", "database", name_w = name_w);
                println!("{:-<name_w$}  ------", "", name_w = name_w);
                for db in &report.threat_databases {
                    println!(
                        "{:<name_w$}  {}",
                        text_or_unknown(&db.name),
                        text_or_unknown(&db.status),
                        name_w = name_w
                    );
                }
            }
            Panel::TechnicalReport => {
                println!("\n== Technical Report ==");
                let ip = &report.ip_reputation;
                println!("IP address      : {}", text_or_unknown(&ip.ip_address));
                println!("ISP             : {}", text_or_unknown(&ip.isp));
                println!("Usage type      : {}", text_or_unknown(&ip.usage_type));
                println!("ASN             : {}", text_or_unknown(&ip.asn));
                println!("Domain name     : {}", text_or_unknown(&ip.domain_name));
                println!("Country         : {}", text_or_unknown(&ip.country));
                println!("City            : {}", text_or_unknown(&ip.city));
                println!("Abuse confidence: {}%", ip.abuse_confidence_score);
                if let Some(redirects) = &report.redirect_chain {
                    println!(
                        "Redirect chain  : {} ({})",
                        if redirects.clean { "Clean" } else { "Suspicious" },
                        redirects.details.as_deref().unwrap_or("")
                    );
                }
                if let Some(tech) = &report.technical_details {
                    if !tech.dns_records.is_empty() {
                        println!("DNS records     : {}", tech.dns_records.join(", "));
                    }
                }
            }
            Panel::CommunityReports => {
                println!("\n== Community Reports ==");
                println!("See the dashboard for community activity on this URL.");
            }
        }
    }

    fn scan_failed(&mut self, message: &str) {
        self.clear_bar();
        eprintln!("Scan failed: {message}");
    }

    fn scan_finished(&mut self) {
        self.clear_bar();
    }
}
