//! OSV-style vulnerability DB client (spec §4.5/§6): `POST {base}/v1/query`
//! with `{package:{name,ecosystem},version}`.

use crate::manifest::Dependency;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

const DEFAULT_OSV_URL: &str = "https://api.osv.dev";

#[derive(Debug, Serialize)]
struct OsvQuery<'a> {
    package: OsvPackage<'a>,
    version: &'a str,
}

#[derive(Debug, Serialize)]
struct OsvPackage<'a> {
    name: &'a str,
    ecosystem: &'a str,
}

#[derive(Debug, Deserialize, Default)]
struct OsvResponse {
    #[serde(default)]
    vulns: Vec<OsvVuln>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OsvVuln {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub severity: Vec<OsvSeverity>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OsvSeverity {
    #[serde(default)]
    pub score: Option<String>,
}

impl OsvVuln {
    /// First CVSS-like numeric score found, if any (spec §4.5).
    pub fn cvss_score(&self) -> Option<f64> {
        self.severity.iter().find_map(|s| {
            let raw = s.score.as_deref()?;
            // CVSS vector strings ("CVSS:3.1/AV:N/...") carry no bare
            // number; plain numeric scores parse directly.
            raw.parse::<f64>().ok()
        })
    }
}

#[derive(Debug, Clone)]
pub struct OsvClient {
    http: reqwest::Client,
    base_url: String,
}

impl OsvClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }

    pub fn default_client() -> Self {
        Self::new(DEFAULT_OSV_URL)
    }

    /// Queries one package. Network errors yield an empty result — never
    /// fatal to the scan (spec §4.5/§7).
    pub async fn query(&self, dep: &Dependency, ecosystem: &str) -> Vec<OsvVuln> {
        let url = format!("{}/v1/query", self.base_url.trim_end_matches('/'));
        let body = OsvQuery {
            package: OsvPackage {
                name: &dep.name,
                ecosystem,
            },
            version: &dep.cleaned_version,
        };
        match self.http.post(&url).json(&body).send().await {
            Ok(resp) => match resp.json::<OsvResponse>().await {
                Ok(parsed) => parsed.vulns,
                Err(e) => {
                    warn!(package = %dep.name, error = %e, "failed to parse OSV response");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(package = %dep.name, error = %e, "OSV query failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cvss_score_parses_bare_number() {
        let vuln = OsvVuln {
            id: "GHSA-1".into(),
            summary: None,
            details: None,
            severity: vec![OsvSeverity {
                score: Some("9.8".into()),
            }],
        };
        assert_eq!(vuln.cvss_score(), Some(9.8));
    }

    #[test]
    fn cvss_score_none_for_vector_string() {
        let vuln = OsvVuln {
            id: "GHSA-2".into(),
            summary: None,
            details: None,
            severity: vec![OsvSeverity {
                score: Some("CVSS:3.1/AV:N/AC:L".into()),
            }],
        };
        assert_eq!(vuln.cvss_score(), None);
    }
}
