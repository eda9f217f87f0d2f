use std::time::Duration;

/// Spacing between consecutive symbols so upstream rate limits stay predictable.
#[async_trait::async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

#[derive(Debug, Clone)]
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait::async_trait]
impl Pacer for FixedDelayPacer {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn waits_at_least_the_configured_delay() {
        let pacer = FixedDelayPacer::new(Duration::from_millis(20));
        let started = Instant::now();
        pacer.pause().await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn zero_delay_returns_immediately() {
        let pacer = FixedDelayPacer::new(Duration::ZERO);
        let started = Instant::now();
        pacer.pause().await;
        assert!(started.elapsed() < Duration::from_millis(20));
    }
}
