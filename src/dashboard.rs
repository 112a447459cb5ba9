//! Consumer side of the dashboard page-data endpoint. The summary view owns
//! its own fetching and pagination; the coordinator only knows the refresh
//! hook it fires after a successful scan.

use serde::{Deserialize, Serialize};

use crate::types::RiskTier;

/// Invoked after a successful scan so the summary view can re-fetch its
/// paginated data. The coordinator does not know or care how that view
/// renders.
pub type RefreshHook = Box<dyn Fn() + Send>;

/// Aggregate counters across all of a user's scans.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DashboardStats {
    pub total_scans: u64,
    pub safe_count: u64,
    pub phishing_count: u64,
}

/// One row of the recent-scans list.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScanSummary {
    pub url: String,
    #[serde(default)]
    pub status: Option<String>,
    pub risk_score: u8,
    #[serde(default)]
    pub scanned_at: Option<String>,
}

impl ScanSummary {
    /// Same classification the result view uses; the two must never drift.
    pub fn tier(&self) -> RiskTier {
        RiskTier::classify(self.risk_score)
    }
}

/// One month of the risk-trend chart.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TrendPoint {
    pub month: String,
    pub malicious: u64,
}

/// One page of dashboard data as served by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DashboardPage {
    #[serde(default)]
    pub stats: DashboardStats,
    #[serde(default)]
    pub scans: Vec<ScanSummary>,
    #[serde(default)]
    pub risk_trend: Vec<TrendPoint>,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

impl DashboardPage {
    /// Tier histogram of the rows on this page: (low, moderate, high).
    pub fn tier_counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for scan in &self.scans {
            match scan.tier() {
                RiskTier::Low => counts.0 += 1,
                RiskTier::Moderate => counts.1 += 1,
                RiskTier::High => counts.2 += 1,
            }
        }
        counts
    }
}
