use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{preview, PrinterAdapter, PrinterError, PrinterStatus, RetryPolicy};
use crate::format::{job_text, PrintJob};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintRecord {
    Text(String),
    Qr { lead: String, data: String },
}

/// Hardware-free printer: logs and remembers what would have been printed.
pub struct MockPrinter {
    records: Mutex<Vec<PrintRecord>>,
    jobs: Mutex<Vec<PrintJob>>,
    failures: AtomicUsize,
    retry: RetryPolicy,
}

impl MockPrinter {
    pub fn new() -> Self {
        Self::with_retry(RetryPolicy::default())
    }

    pub fn with_retry(retry: RetryPolicy) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            jobs: Mutex::new(Vec::new()),
            failures: AtomicUsize::new(0),
            retry,
        }
    }

    /// Makes the next `count` print attempts fail with an I/O error.
    #[allow(dead_code)]
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    #[allow(dead_code)]
    pub fn records(&self) -> Vec<PrintRecord> {
        self.lock_records().clone()
    }

    /// Styled text jobs as received, before flattening into records.
    #[allow(dead_code)]
    pub fn jobs(&self) -> Vec<PrintJob> {
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, Vec<PrintRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn attempt(&self) -> Result<(), PrinterError> {
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(PrinterError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated printer failure",
            )));
        }
        Ok(())
    }
}

impl Default for MockPrinter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrinterAdapter for MockPrinter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn print_text(&self, job: PrintJob) -> Result<(), PrinterError> {
        self.retry.run("Print", move || async move { self.attempt() }).await?;

        let text = job_text(&job);
        info!("Printed (mock): {}", preview(&text));
        self.lock_records().push(PrintRecord::Text(text));
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(job);
        Ok(())
    }

    async fn print_qr(&self, lead: PrintJob, data: String) -> Result<(), PrinterError> {
        self.retry.run("QR print", move || async move { self.attempt() }).await?;

        info!("QR printed (mock): {}", preview(&data));
        self.lock_records().push(PrintRecord::Qr {
            lead: job_text(&lead),
            data,
        });
        Ok(())
    }

    async fn status(&self) -> PrinterStatus {
        PrinterStatus {
            online: true,
            paper: Some(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::format::Segment;

    fn quick_mock() -> MockPrinter {
        MockPrinter::with_retry(RetryPolicy {
            attempts: 3,
            delay: Duration::ZERO,
        })
    }

    #[tokio::test]
    async fn test_mock_records_jobs() {
        let printer = quick_mock();

        printer.print_text(vec![Segment::plain("hello")]).await.unwrap();
        printer
            .print_qr(vec![Segment::plain("header\n")], "https://example.com".to_string())
            .await
            .unwrap();

        assert_eq!(
            printer.records(),
            vec![
                PrintRecord::Text("hello".to_string()),
                PrintRecord::Qr {
                    lead: "header\n".to_string(),
                    data: "https://example.com".to_string(),
                },
            ]
        );
        assert_eq!(printer.jobs(), vec![vec![Segment::plain("hello")]]);
    }

    #[tokio::test]
    async fn test_mock_status_is_fixed() {
        let status = quick_mock().status().await;
        assert!(status.online);
        assert_eq!(status.paper_status().label(), "adequate");
    }

    #[tokio::test]
    async fn test_mock_failures_go_through_retries() {
        let printer = quick_mock();

        printer.fail_next(2);
        printer.print_text(vec![Segment::plain("second try")]).await.unwrap();
        assert_eq!(printer.records().len(), 1);

        printer.fail_next(5);
        assert!(matches!(
            printer.print_text(vec![Segment::plain("lost")]).await,
            Err(PrinterError::Exhausted { attempts: 3, .. })
        ));
        assert_eq!(printer.records().len(), 1);
    }
}
