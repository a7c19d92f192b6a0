use std::future::Future;
use std::time::Duration;

use super::PrinterError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: usize,
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

impl RetryPolicy {
    /// Runs `op` until it succeeds, fails permanently, or runs out of attempts.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, PrinterError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PrinterError>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    error!("{} attempt {}/{} failed: {}", label, attempt, attempts, e);
                    if attempt >= attempts {
                        return Err(PrinterError::Exhausted {
                            attempts,
                            last: Box::new(e),
                        });
                    }
                }
            }

            attempt += 1;
            tokio::time::sleep(self.delay).await;
        }
    }
}
