use serde::{Deserialize, Serialize};

/// One interim progress push for an in-flight scan.
///
/// Arrival order is not guaranteed to match the logical step order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub step: String,
    pub detail: String,
}

/// Validity of the target's TLS certificate as judged by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SslCertificate {
    pub valid: bool,
    #[serde(default)]
    pub details: Option<String>,
}

/// Registration age of the scanned domain.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DomainAge {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub age_days: i64,
}

/// Suspicious-keyword findings in the URL itself.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct KeywordFindings {
    pub detected: bool,
    #[serde(default)]
    pub keywords_found: Vec<String>,
}

/// Lookup outcome against one external threat database.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ThreatDatabaseEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Reputation record for the resolved IP address.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct IpReputation {
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub isp: Option<String>,
    #[serde(default)]
    pub usage_type: Option<String>,
    #[serde(default)]
    pub asn: Option<String>,
    #[serde(default)]
    pub domain_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub abuse_confidence_score: u8,
}

/// Redirect-chain verdict. Optional on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RedirectChain {
    pub clean: bool,
    #[serde(default)]
    pub details: Option<String>,
}

/// Raw DNS answers for the technical panel. Optional on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TechnicalDetails {
    #[serde(default)]
    pub dns_records: Vec<String>,
}

/// The settled scan payload. Immutable once received; consumed once by the
/// render pipeline and then discarded.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ScanReport {
    pub risk_score: u8,
    #[serde(default)]
    pub ssl_certificate: SslCertificate,
    #[serde(default)]
    pub domain_age: DomainAge,
    #[serde(default)]
    pub keywords: KeywordFindings,
    #[serde(default)]
    pub threat_databases: Vec<ThreatDatabaseEntry>,
    #[serde(default)]
    pub ip_reputation: IpReputation,
    #[serde(default)]
    pub redirect_chain: Option<RedirectChain>,
    #[serde(default)]
    pub technical_details: Option<TechnicalDetails>,
}

impl ScanReport {
    /// Coarse tier for this report's score.
    pub fn tier(&self) -> RiskTier {
        RiskTier::classify(self.risk_score)
    }
}

/// Coarse risk classification derived from the numeric score.
///
/// Single source of truth for every widget that displays risk; derived on
/// demand, never stored.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// Total over all scores: >= 70 High, 40..=69 Moderate, < 40 Low.
    pub fn classify(score: u8) -> Self {
        match score {
            70.. => RiskTier::High,
            40..=69 => RiskTier::Moderate,
            _ => RiskTier::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Moderate => "Moderate Risk",
            RiskTier::High => "High Risk",
        }
    }

    /// Headline shown above the completion ring.
    pub fn headline(self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk Detected",
            RiskTier::Moderate => "Moderate Risk Detected",
            RiskTier::High => "High Risk Detected",
        }
    }

    /// One-line verdict text under the headline.
    pub fn verdict(self) -> &'static str {
        match self {
            RiskTier::Low => "No significant phishing indicators found",
            RiskTier::Moderate => "This URL shows some suspicious characteristics",
            RiskTier::High => "This URL shows multiple phishing indicators",
        }
    }

    /// Display color for the completion ring.
    pub fn color(self) -> &'static str {
        match self {
            RiskTier::Low => "#22c55e",
            RiskTier::Moderate => "#f59e0b",
            RiskTier::High => "#ef4444",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(RiskTier::classify(0), RiskTier::Low);
        assert_eq!(RiskTier::classify(39), RiskTier::Low);
        assert_eq!(RiskTier::classify(40), RiskTier::Moderate);
        assert_eq!(RiskTier::classify(69), RiskTier::Moderate);
        assert_eq!(RiskTier::classify(70), RiskTier::High);
        assert_eq!(RiskTier::classify(100), RiskTier::High);
    }

    #[test]
    fn report_tolerates_missing_sections() {
        let json = r#"{"risk_score": 40}"#;
        let report: ScanReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.risk_score, 40);
        assert!(report.threat_databases.is_empty());
        assert!(report.ip_reputation.ip_address.is_none());
        assert_eq!(report.tier(), RiskTier::Moderate);
    }

    #[test]
    fn report_parses_full_payload() {
        let json = r#"{
            "risk_score": 80,
            "ssl_certificate": {"valid": false, "details": "hostname mismatch"},
            "domain_age": {"status": "New", "age_days": 12},
            "keywords": {"detected": true, "keywords_found": ["login", "verify-account"]},
            "threat_databases": [
                {"name": "Google Safe Browsing", "status": "Reported"},
                {"name": "PhishTank", "status": "Safe"}
            ],
            "ip_reputation": {
                "ip_address": "203.0.113.7",
                "isp": "Example Hosting",
                "usage_type": "Data Center",
                "asn": "AS64500",
                "domain_name": "example.net",
                "country": "NL",
                "city": "Amsterdam",
                "abuse_confidence_score": 61
            }
        }"#;
        let report: ScanReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.tier(), RiskTier::High);
        assert_eq!(report.threat_databases.len(), 2);
        assert_eq!(report.ip_reputation.abuse_confidence_score, 61);
        assert!(report.redirect_chain.is_none());
    }
}
