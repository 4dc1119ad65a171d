use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageStats {
    pub requests: u64,
    pub failures: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_latency: Duration,
    pub slowest: Duration,
}

impl UsageStats {
    pub fn average_latency(&self) -> Duration {
        let successes = self.requests.saturating_sub(self.failures);
        if successes == 0 {
            Duration::ZERO
        } else {
            self.total_latency / successes as u32
        }
    }
}

/// Per-session accounting of Messages API traffic.
pub struct UsageMonitor {
    stats: Mutex<UsageStats>,
    start_time: Instant,
    enabled: bool,
}

impl UsageMonitor {
    pub fn new(enabled: bool) -> Self {
        Self {
            stats: Mutex::new(UsageStats::default()),
            start_time: Instant::now(),
            enabled,
        }
    }

    pub fn record_success(&self, input_tokens: u64, output_tokens: u64, latency: Duration) {
        let Ok(mut stats) = self.stats.lock() else {
            return;
        };
        stats.requests += 1;
        stats.input_tokens += input_tokens;
        stats.output_tokens += output_tokens;
        stats.total_latency += latency;
        if latency > stats.slowest {
            stats.slowest = latency;
        }

        if self.enabled {
            tracing::info!(
                "📊 Tokens in: {}, out: {}, latency: {:?}",
                input_tokens,
                output_tokens,
                latency
            );
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.requests += 1;
            stats.failures += 1;
        }
    }

    pub fn get_stats(&self) -> UsageStats {
        self.stats
            .lock()
            .map(|stats| stats.clone())
            .unwrap_or_default()
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let stats = self.get_stats();
        tracing::info!(
            "📊 Session - Requests: {} ({} failed), Tokens in/out: {}/{}, Avg latency: {:?}, Uptime: {:?}",
            stats.requests,
            stats.failures,
            stats.input_tokens,
            stats.output_tokens,
            stats.average_latency(),
            self.start_time.elapsed()
        );
    }
}

impl Default for UsageMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
