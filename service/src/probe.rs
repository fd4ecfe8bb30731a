// service/src/probe.rs

use std::str::FromStr;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use tracing::debug;

use storage::ObjectStore;

/// The two document kinds drivers upload during registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    DrivingLicense,
    PoliceReport,
}

impl DocumentKind {
    /// Filename stem used by current uploads.
    pub fn base_file_name(&self) -> &'static str {
        match self {
            DocumentKind::DrivingLicense => "driving_license",
            DocumentKind::PoliceReport => "police_report",
        }
    }

    /// Shorter stem older uploads were stored under.
    pub fn alias(&self) -> &'static str {
        match self {
            DocumentKind::DrivingLicense => "license",
            DocumentKind::PoliceReport => "police_report",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::DrivingLicense => "Driving License",
            DocumentKind::PoliceReport => "Police Clearance Report",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "license" | "driving_license" => Ok(DocumentKind::DrivingLicense),
            "police_report" | "police-report" => Ok(DocumentKind::PoliceReport),
            other => Err(format!("unknown document kind '{}'", other)),
        }
    }
}

/// Outcome of a probe. `is_mock` marks the synthesized placeholder so callers
/// never mistake it for a real document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub url: String,
    pub path: Option<String>,
    pub is_mock: bool,
    pub error: Option<String>,
}

/// Candidate storage paths in probe order. The list accumulated as the
/// upload schema evolved; earlier entries are the current conventions,
/// later ones are legacy layouts still holding old uploads.
pub fn candidate_paths(driver_id: &str, kind: DocumentKind) -> Vec<String> {
    let base = kind.base_file_name();
    let alias = kind.alias();
    vec![
        format!("driver_documents/{driver_id}/{base}.pdf"),
        format!("driver_documents/{driver_id}/{alias}.pdf"),
        format!("drivers/{driver_id}/{base}.pdf"),
        format!("drivers/{driver_id}/{alias}.pdf"),
        format!("uploads/drivers/{driver_id}/{alias}.pdf"),
        format!("documents/drivers/{driver_id}/{base}.pdf"),
        format!("user_documents/{driver_id}/{alias}.pdf"),
        format!("{driver_id}/{alias}.pdf"),
        format!("{driver_id}/documents/{alias}.pdf"),
    ]
}

/// Resolves driver documents against the object store: folder listing
/// first (one round trip), then the ordered candidate-path chain, then an
/// explanatory placeholder. Never fails.
#[derive(Clone)]
pub struct DocumentProbe {
    objects: Arc<dyn ObjectStore>,
}

impl DocumentProbe {
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        DocumentProbe { objects }
    }

    pub async fn resolve(&self, driver_id: &str, kind: DocumentKind) -> ProbeResult {
        // Listing the driver's folder needs one round trip and survives
        // uploads with timestamped filenames.
        let folder = format!("driver_documents/{driver_id}");
        if let Ok(entries) = self.objects.list(&folder).await {
            let prefix = kind.base_file_name();
            let matching = entries.iter().find(|entry| {
                let name = entry.name.to_lowercase();
                name.starts_with(prefix) && name.ends_with(".pdf")
            });
            if let Some(entry) = matching {
                if let Ok(url) = self.objects.download_url(&entry.path).await {
                    debug!(driver_id, path = %entry.path, "document found via folder listing");
                    return ProbeResult {
                        url,
                        path: Some(entry.path.clone()),
                        is_mock: false,
                        error: None,
                    };
                }
            }
        }

        let candidates = candidate_paths(driver_id, kind);
        for path in &candidates {
            match self.objects.download_url(path).await {
                Ok(url) => {
                    debug!(driver_id, path = %path, "document found via candidate path");
                    return ProbeResult {
                        url,
                        path: Some(path.clone()),
                        is_mock: false,
                        error: None,
                    };
                }
                Err(_) => continue,
            }
        }

        debug!(driver_id, kind = ?kind, "no document found, returning placeholder");
        let reason = format!(
            "{} not found in storage. Driver may not have uploaded this document yet.",
            kind.title()
        );
        ProbeResult {
            url: placeholder_document(driver_id, kind, &candidates),
            path: None,
            is_mock: true,
            error: Some(reason),
        }
    }

    /// Whether any candidate resolves, without keeping the URL.
    pub async fn exists(&self, driver_id: &str, kind: DocumentKind) -> bool {
        !self.resolve(driver_id, kind).await.is_mock
    }
}

/// A self-describing HTML page served as a `data:` URL when every candidate
/// fails. Operator UX only; never persisted.
fn placeholder_document(driver_id: &str, kind: DocumentKind, tried: &[String]) -> String {
    let mut paths = String::new();
    for path in tried {
        paths.push_str(&format!("        <li><code>{}</code></li>\n", path));
    }
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Document Viewer - {title}</title>
  <style>
    body {{ font-family: sans-serif; background: #f5f5f5; padding: 24px; }}
    .card {{ max-width: 720px; margin: 0 auto; background: #fff; border-radius: 8px; padding: 32px; }}
    .alert {{ background: #fff3cd; color: #856404; padding: 14px; border-radius: 6px; }}
    code {{ background: #f0f0f0; padding: 1px 4px; }}
  </style>
</head>
<body>
  <div class="card">
    <h1>{title}</h1>
    <p class="alert"><strong>Document not available.</strong>
    The {title_lower} for driver <code>{driver_id}</code> was not found in storage.</p>
    <p>Storage paths checked, in order:</p>
    <ul>
{paths}    </ul>
    <p>The driver may not have uploaded this document yet, or it may live at a
    path outside the known conventions.</p>
  </div>
</body>
</html>
"#,
        title = kind.title(),
        title_lower = kind.title().to_lowercase(),
        driver_id = driver_id,
        paths = paths,
    );
    format!("data:text/html;base64,{}", BASE64.encode(html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::MemoryObjectStore;

    #[tokio::test]
    async fn folder_listing_wins_over_path_guessing() {
        let objects = MemoryObjectStore::new();
        objects
            .insert(
                "driver_documents/d1/driving_license_1714.pdf",
                "https://cdn/license",
            )
            .await;
        let probe = DocumentProbe::new(Arc::new(objects));
        let result = probe.resolve("d1", DocumentKind::DrivingLicense).await;
        assert!(!result.is_mock);
        assert_eq!(result.url, "https://cdn/license");
        assert_eq!(
            result.path.as_deref(),
            Some("driver_documents/d1/driving_license_1714.pdf")
        );
    }

    #[tokio::test]
    async fn candidates_are_probed_in_order_and_stop_at_the_first_hit() {
        let objects = MemoryObjectStore::new();
        // only the 4th candidate path exists
        objects
            .insert("drivers/d2/license.pdf", "https://cdn/fourth")
            .await;
        // a later candidate also exists and must not be chosen
        objects
            .insert("d2/license.pdf", "https://cdn/eighth")
            .await;
        let probe = DocumentProbe::new(Arc::new(objects));
        let result = probe.resolve("d2", DocumentKind::DrivingLicense).await;
        assert!(!result.is_mock);
        assert_eq!(result.url, "https://cdn/fourth");
        assert_eq!(result.path.as_deref(), Some("drivers/d2/license.pdf"));
    }

    #[tokio::test]
    async fn exhausted_probe_returns_a_marked_placeholder() {
        let probe = DocumentProbe::new(Arc::new(MemoryObjectStore::new()));
        let result = probe.resolve("d3", DocumentKind::PoliceReport).await;
        assert!(result.is_mock);
        assert!(result.path.is_none());
        assert!(result.url.starts_with("data:text/html;base64,"));
        let reason = result.error.expect("placeholder carries a reason");
        assert!(!reason.is_empty());
        assert!(reason.contains("Police Clearance Report"));
        assert!(!probe.exists("d3", DocumentKind::PoliceReport).await);
    }

    #[test]
    fn candidate_order_is_fixed() {
        let paths = candidate_paths("d9", DocumentKind::DrivingLicense);
        assert_eq!(paths.len(), 9);
        assert_eq!(paths[0], "driver_documents/d9/driving_license.pdf");
        assert_eq!(paths[1], "driver_documents/d9/license.pdf");
        assert_eq!(paths[3], "drivers/d9/license.pdf");
        assert_eq!(paths[8], "d9/documents/license.pdf");
    }
}
