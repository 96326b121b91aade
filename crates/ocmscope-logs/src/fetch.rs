use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use ocmscope_k8s::KubeClient;
use ocmscope_types::LogRequest;

/// Outcome of one log fetch, delivered to the UI loop
#[derive(Debug)]
pub enum FetchEvent {
    Loaded { request: LogRequest, text: String },
    Failed { request: LogRequest, error: String },
}

/// How often and how patiently to retry a failed fetch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

/// Anything that can produce the full text of a container log
pub trait LogSource: Send + Sync + 'static {
    fn fetch(&self, request: &LogRequest) -> impl Future<Output = Result<String>> + Send;
}

/// Reads logs from the cluster named by the request's context
pub struct KubeLogSource {
    kube: Arc<KubeClient>,
}

impl KubeLogSource {
    pub fn new(kube: Arc<KubeClient>) -> Self {
        Self { kube }
    }
}

impl LogSource for KubeLogSource {
    async fn fetch(&self, request: &LogRequest) -> Result<String> {
        let client = self
            .kube
            .client_for_context(request.context.as_deref())
            .await?;
        self.kube.fetch_logs(&client, request).await
    }
}

/// Reads a previously exported log from disk
pub struct FileLogSource {
    path: PathBuf,
}

impl FileLogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LogSource for FileLogSource {
    async fn fetch(&self, _request: &LogRequest) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .context(format!("Failed to read {}", self.path.display()))
    }
}

/// Run one fetch with bounded retries
pub async fn fetch_with_retry<S: LogSource>(
    source: &S,
    request: &LogRequest,
    policy: RetryPolicy,
) -> Result<String> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        tracing::debug!(log = %request.label(), attempt, "fetching logs");
        match source.fetch(request).await {
            Ok(text) => return Ok(text),
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    log = %request.label(),
                    attempt,
                    error = %e,
                    "log fetch failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Owns the background task fetching the log currently on screen
///
/// Dropping or stopping the fetcher cancels the task, so a slow fetch for
/// a container the user has already left never overwrites the view.
pub struct LogFetcher {
    cancel: CancellationToken,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl LogFetcher {
    /// Spawn a fetch for `request`; the result arrives on `tx`
    pub fn start<S: LogSource>(
        source: Arc<S>,
        request: LogRequest,
        policy: RetryPolicy,
        tx: mpsc::UnboundedSender<FetchEvent>,
    ) -> Self {
        let cancel = CancellationToken::new();

        let task = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!(log = %request.label(), "log fetch cancelled");
                    }

                    result = fetch_with_retry(source.as_ref(), &request, policy) => {
                        let event = match result {
                            Ok(text) => FetchEvent::Loaded { request, text },
                            Err(e) => FetchEvent::Failed {
                                request,
                                error: format!("{:#}", e),
                            },
                        };
                        let _ = tx.send(event);
                    }
                }
            })
        };

        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Cancel the fetch if it is still running
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for LogFetcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use anyhow::anyhow;

    /// Fails a fixed number of times before succeeding
    struct FlakySource {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakySource {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl LogSource for FlakySource {
        async fn fetch(&self, _request: &LogRequest) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(anyhow!("connection refused"))
            } else {
                Ok("line 1\nline 2".to_string())
            }
        }
    }

    /// Never finishes
    struct StuckSource;

    impl LogSource for StuckSource {
        async fn fetch(&self, _request: &LogRequest) -> Result<String> {
            std::future::pending().await
        }
    }

    fn quick(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let source = FlakySource::new(2);
        let request = LogRequest::new("shop", "web");
        let text = fetch_with_retry(&source, &request, quick(3)).await.unwrap();
        assert_eq!(text, "line 1\nline 2");
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_attempts() {
        let source = FlakySource::new(5);
        let request = LogRequest::new("shop", "web");
        let err = fetch_with_retry(&source, &request, quick(3)).await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetcher_delivers_result() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = LogRequest::new("shop", "web");
        let _fetcher = LogFetcher::start(
            Arc::new(FlakySource::new(1)),
            request.clone(),
            quick(2),
            tx,
        );

        match rx.recv().await {
            Some(FetchEvent::Loaded { request: r, text }) => {
                assert_eq!(r, request);
                assert_eq!(text, "line 1\nline 2");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetcher_reports_failure() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _fetcher = LogFetcher::start(
            Arc::new(FlakySource::new(10)),
            LogRequest::new("shop", "web"),
            quick(1),
            tx,
        );

        assert!(matches!(rx.recv().await, Some(FetchEvent::Failed { .. })));
    }

    #[tokio::test]
    async fn test_stop_cancels_without_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut fetcher =
            LogFetcher::start(Arc::new(StuckSource), LogRequest::new("shop", "web"), quick(1), tx);

        fetcher.stop();
        assert!(!fetcher.is_running());
        // The sender is dropped with the task, so the channel closes empty
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_file_source_reads_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web-app.log");
        std::fs::write(&path, "exported\nlines").unwrap();

        let text = FileLogSource::new(&path)
            .fetch(&LogRequest::new("shop", "web"))
            .await
            .unwrap();
        assert_eq!(text, "exported\nlines");
    }
}
