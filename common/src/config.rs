use std::time::Duration;

/// Admission ceilings for the probing modes. Each mode gets its own
/// limit because the cost profile differs: a connect probe is cheap, a
/// full ping exchange holds its permit for several seconds.
pub const PING_CONCURRENCY: usize = 20;
pub const SCAN_CONCURRENCY: usize = 100;
pub const SWEEP_CONCURRENCY: usize = 50;

/// Knobs for the multi-host ping engine.
#[derive(Debug, Clone)]
pub struct PingConfig {
    /// Echo requests sent per host.
    pub count: u32,
    /// Deadline for each individual echo.
    pub timeout: Duration,
    /// Pause between consecutive echoes to the same host.
    pub interval: Duration,
    pub concurrency: usize,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            count: 3,
            timeout: Duration::from_secs(1),
            interval: Duration::from_secs(1),
            concurrency: PING_CONCURRENCY,
        }
    }
}

/// Knobs for the TCP connect scanner.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Deadline for each connect attempt.
    pub timeout: Duration,
    pub concurrency: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            concurrency: SCAN_CONCURRENCY,
        }
    }
}

/// Knobs for the local-subnet sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Deadline for the single echo sent to each address.
    pub timeout: Duration,
    pub concurrency: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(500),
            concurrency: SWEEP_CONCURRENCY,
        }
    }
}

/// Knobs for the hop-discovery walk.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    pub max_hops: u8,
    /// How long the listener waits for each hop's reply.
    pub reply_timeout: Duration,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_hops: 30,
            reply_timeout: Duration::from_secs(2),
        }
    }
}
