//! Detection service. Classify submitted articles and record the verdicts.
//!
//! Coordinates the classification client (verdict) and the report store (history).

use crate::domain::{ClassificationRequest, ClassificationResult, DomainError, NewReport};
use crate::ports::ReportStore;
use crate::usecases::classification_client::ClassificationClient;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

/// A verdict together with the id of the report that records it.
#[derive(Debug, Clone)]
pub struct Detection {
    pub report_id: i64,
    pub title: String,
    pub source: Option<String>,
    pub result: ClassificationResult,
}

/// Service for checking articles.
///
/// Orchestrates the flow:
/// 1. Classify via the resilient client (runs to completion even if the caller goes away)
/// 2. Persist a truncated report
/// 3. Return the verdict with the stored id
pub struct DetectionService {
    client: Arc<ClassificationClient>,
    store: Arc<dyn ReportStore>,
}

impl DetectionService {
    pub fn new(client: Arc<ClassificationClient>, store: Arc<dyn ReportStore>) -> Self {
        Self { client, store }
    }

    /// Classify an article and store the result.
    ///
    /// Classification and storage run on their own task: dropping the caller neither cancels
    /// a request mid-retry nor loses its report.
    pub async fn detect(
        &self,
        title: &str,
        content: &str,
        source: Option<String>,
    ) -> Result<Detection, DomainError> {
        let client = Arc::clone(&self.client);
        let store = Arc::clone(&self.store);
        let title = title.to_string();
        let content = content.to_string();
        tokio::spawn(async move {
            record_detection(&client, store.as_ref(), title, content, source).await
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "detection task aborted");
            DomainError::Classification(format!("detection task failed: {}", e))
        })?
    }

    /// Classify the contents of a UTF-8 text file. The title comes from the file name.
    pub async fn detect_file(&self, path: &Path) -> Result<Detection, DomainError> {
        let bytes = fs::read(path)
            .await
            .map_err(|e| DomainError::InvalidInput(format!("read {}: {}", path.display(), e)))?;
        let content = String::from_utf8(bytes).map_err(|_| {
            DomainError::InvalidInput(format!("{} is not valid UTF-8 text", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| DomainError::InvalidInput(format!("{} has no file name", path.display())))?;

        let title = title_from_file_name(&file_name);
        self.detect(&title, &content, Some(format!("Uploaded file: {}", file_name)))
            .await
    }

    /// Free-form analysis; nothing is stored.
    pub async fn analyze(&self, text: &str) -> Result<String, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::InvalidInput("nothing to analyze".to_string()));
        }
        let client = Arc::clone(&self.client);
        let text = text.to_string();
        tokio::spawn(async move { client.analyze(&text).await })
            .await
            .map_err(|e| DomainError::Classification(format!("analysis task failed: {}", e)))?
    }
}

async fn record_detection(
    client: &ClassificationClient,
    store: &dyn ReportStore,
    title: String,
    content: String,
    source: Option<String>,
) -> Result<Detection, DomainError> {
    let request = ClassificationRequest::new(title.as_str(), content.as_str());
    let result = client.classify(&request).await?;

    let report = NewReport::from_classification(&title, &content, source, &result, Utc::now());
    let report_id = store.insert(&report).await?;

    info!(
        report_id,
        is_fake = result.is_fake,
        origin = %result.origin,
        "detection recorded"
    );

    Ok(Detection {
        report_id,
        title,
        source: report.source,
        result,
    })
}

/// `breaking_news-report.txt` → `Breaking News-Report`: extension dropped, underscores to
/// spaces, each word capitalized with the rest lowercased.
pub fn title_from_file_name(file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    let spaced = stem.replace('_', " ");
    let mut title = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for c in spaced.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                title.extend(c.to_uppercase());
            } else {
                title.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            title.push(c);
            at_word_start = true;
        }
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::MemoryReportStore;
    use crate::domain::{ApiKey, KeyPool, Origin, ReportQuery};
    use crate::ports::{ClassifierGateway, GatewayError};
    use crate::usecases::classification_client::RetryPolicy;

    struct FixedGateway(Result<String, GatewayError>);

    #[async_trait::async_trait]
    impl ClassifierGateway for FixedGateway {
        async fn call(&self, _credential: &ApiKey, _prompt: &str) -> Result<String, GatewayError> {
            self.0.clone()
        }
    }

    fn service(reply: Result<String, GatewayError>) -> (DetectionService, Arc<MemoryReportStore>) {
        let client = ClassificationClient::new(
            Arc::new(FixedGateway(reply)),
            Arc::new(KeyPool::new(["k1", "k2"]).unwrap()),
            RetryPolicy::immediate(),
            2,
        );
        let store = Arc::new(MemoryReportStore::new());
        (
            DetectionService::new(Arc::new(client), Arc::clone(&store) as Arc<dyn ReportStore>),
            store,
        )
    }

    #[tokio::test]
    async fn test_detect_stores_truncated_report() {
        let (svc, store) = service(Ok(
            r#"{"is_fake": true, "confidence": 0.92, "explanation": "Invented."}"#.to_string(),
        ));
        let long = "word ".repeat(200);
        let detection = svc
            .detect("Aliens vote", &long, Some("Tabloid".to_string()))
            .await
            .unwrap();
        assert!(detection.result.is_fake);
        assert_eq!(detection.result.origin, Origin::Structured);

        let stored = store.query(&ReportQuery::all()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, detection.report_id);
        assert!(stored[0].content.ends_with("..."));
        assert_eq!(stored[0].content.chars().count(), 503);
        assert_eq!(stored[0].source.as_deref(), Some("Tabloid"));
    }

    #[tokio::test]
    async fn test_degraded_detection_is_still_stored() {
        let (svc, store) = service(Err(GatewayError::RateLimited("quota".to_string())));
        let detection = svc.detect("Calm news", "Nothing odd.", None).await.unwrap();
        assert_eq!(detection.result.origin, Origin::Fallback);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_gateway_failure_stores_nothing() {
        let (svc, store) = service(Err(GatewayError::Other("bad request".to_string())));
        let err = svc.detect("t", "c", None).await.unwrap_err();
        assert!(matches!(err, DomainError::Classification(_)));
        assert!(store.is_empty().await);
    }

    /// Answers after a fixed delay on the (paused) test clock.
    struct SlowGateway(std::time::Duration);

    #[async_trait::async_trait]
    impl ClassifierGateway for SlowGateway {
        async fn call(&self, _credential: &ApiKey, _prompt: &str) -> Result<String, GatewayError> {
            tokio::time::sleep(self.0).await;
            Ok(r#"{"is_fake": false, "confidence": 0.2, "explanation": "Checks out."}"#.to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_caller_still_records_report() {
        use std::time::Duration;

        let client = ClassificationClient::new(
            Arc::new(SlowGateway(Duration::from_secs(5))),
            Arc::new(KeyPool::new(["k1"]).unwrap()),
            RetryPolicy::immediate(),
            1,
        );
        let store = Arc::new(MemoryReportStore::new());
        let svc = DetectionService::new(Arc::new(client), Arc::clone(&store) as Arc<dyn ReportStore>);

        let abandoned =
            tokio::time::timeout(Duration::from_secs(1), svc.detect("Slow wire", "Body.", None))
                .await;
        assert!(abandoned.is_err());
        assert!(store.is_empty().await);

        tokio::time::sleep(Duration::from_secs(10)).await;
        let stored = store.query(&ReportQuery::all()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "Slow wire");
        assert!(!stored[0].is_fake);
    }

    #[tokio::test]
    async fn test_detect_file_uses_file_name() {
        let (svc, store) = service(Ok("no json here".to_string()));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moon_base_FOUND.txt");
        tokio::fs::write(&path, "Scientists found a base.").await.unwrap();

        let detection = svc.detect_file(&path).await.unwrap();
        assert_eq!(detection.title, "Moon Base Found");
        assert_eq!(
            detection.source.as_deref(),
            Some("Uploaded file: moon_base_FOUND.txt")
        );
        assert_eq!(detection.result.origin, Origin::HeuristicParse);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_detect_file_rejects_binary() {
        let (svc, _store) = service(Ok("unused".to_string()));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        tokio::fs::write(&path, [0xff, 0xfe, 0x00]).await.unwrap();
        let err = svc.detect_file(&path).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_analyze_rejects_blank() {
        let (svc, _store) = service(Ok("unused".to_string()));
        assert!(matches!(
            svc.analyze("   ").await.unwrap_err(),
            DomainError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_title_from_file_name() {
        assert_eq!(title_from_file_name("breaking_news.txt"), "Breaking News");
        assert_eq!(title_from_file_name("ALL_CAPS_story.md"), "All Caps Story");
        assert_eq!(title_from_file_name("noext"), "Noext");
        assert_eq!(title_from_file_name("it's_2024.txt"), "It'S 2024");
    }
}
