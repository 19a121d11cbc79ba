//! Package domain model
//!
//! A [`Package`] carries the business rules that matter when recommending
//! software: whether it is open source, and how it ranks against other
//! candidates. Ranking lives here rather than in the tools so the rules
//! stay testable without a package manager on the host.

use serde::{Deserialize, Serialize};

/// Homebrew's two package flavors: formulae are command-line tools,
/// casks are GUI applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    Formula,
    Cask,
}

impl PackageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageKind::Formula => "formula",
            PackageKind::Cask => "cask",
        }
    }
}

/// Software license classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum License {
    Mit,
    Apache2,
    Gpl3,
    Bsd,
    Proprietary,
    Other(String),
    Unknown,
}

impl License {
    /// Parse a license string as reported by the package manager
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim();
        if normalized.is_empty() {
            return License::Unknown;
        }
        match normalized.to_ascii_uppercase().as_str() {
            "MIT" => License::Mit,
            "APACHE-2.0" | "APACHE 2.0" => License::Apache2,
            "GPL-3.0" | "GPL-3.0-OR-LATER" | "GPL-3.0-ONLY" => License::Gpl3,
            s if s.starts_with("BSD") => License::Bsd,
            "PROPRIETARY" | "COMMERCIAL" => License::Proprietary,
            _ => License::Other(normalized.to_string()),
        }
    }

    pub fn is_open_source(&self) -> bool {
        matches!(
            self,
            License::Mit | License::Apache2 | License::Gpl3 | License::Bsd
        )
    }

    /// Canonical display name (SPDX-style where known)
    pub fn name(&self) -> &str {
        match self {
            License::Mit => "MIT",
            License::Apache2 => "Apache-2.0",
            License::Gpl3 => "GPL-3.0",
            License::Bsd => "BSD",
            License::Proprietary => "Proprietary",
            License::Other(s) => s,
            License::Unknown => "Unknown",
        }
    }
}

/// A software package as known to the package manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub description: String,
    pub kind: PackageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub license: License,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// 30-day download count where the manager reports one
    pub download_count: u64,
    pub installed: bool,
}

impl Package {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: PackageKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            version: None,
            license: License::Unknown,
            homepage: None,
            download_count: 0,
            installed: false,
        }
    }

    /// Recommendation score used to rank search results.
    ///
    /// Open-source packages with a license the user prefers rank first,
    /// then general open source, with popularity as a log-scale tiebreaker
    /// so a million downloads doesn't drown out licensing entirely.
    pub fn score(&self, preferred_licenses: &[String]) -> f64 {
        let mut score = 0.0;

        if self.license.is_open_source() {
            score += 15.0;
            if preferred_licenses
                .iter()
                .any(|l| l.eq_ignore_ascii_case(self.license.name()))
            {
                score += 15.0;
            }
        } else if matches!(self.license, License::Proprietary) {
            score -= 10.0;
        }

        if self.download_count > 0 {
            score += (self.download_count as f64).log10() * 5.0;
        }

        if self.homepage.is_some() {
            score += 2.0;
        }

        score
    }
}

/// Result of a package search, ranked for recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub keyword: String,
    pub total_count: usize,
    pub packages: Vec<Package>,
}
