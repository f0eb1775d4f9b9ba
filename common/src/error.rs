use thiserror::Error;

/// Error taxonomy shared by the probing subsystems.
///
/// The propagation policy is decided at each engine, not here:
/// resolution failures become results carrying maximal loss, transport
/// failures abort ping batches and traces but are swallowed per task
/// during scans and sweeps, parse failures are recorded per hop, and
/// input failures skip the offending token only. Timeouts are not
/// errors; they are recorded as statuses on the results themselves.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to resolve host '{0}'")]
    Resolution(String),

    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),

    #[error("malformed reply: {0}")]
    Parse(String),

    #[error("invalid input: {0}")]
    Input(String),
}
