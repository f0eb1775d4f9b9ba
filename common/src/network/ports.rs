//! Port specification parsing.

use tracing::warn;

use crate::error::ProbeError;

pub const MIN_PORT: u32 = 1;
pub const MAX_PORT: u32 = 65535;

/// Expands a comma-separated port specification such as
/// `"80,443,8000-8100"` into the concrete list of ports to probe.
///
/// Tokens are validated independently: a non-numeric token, an
/// out-of-range value or a malformed range is skipped with a diagnostic
/// and never invalidates the rest of the input. A reversed range
/// (`"443-80"`) is normalized by swapping its endpoints before
/// expansion. Overlapping tokens are kept as-is, so the output may
/// contain duplicates; order follows the input.
pub fn parse_port_spec(spec: &str) -> Vec<u16> {
    let mut ports: Vec<u16> = Vec::new();

    for token in spec.split(',') {
        let token = token.trim();
        if token.is_empty() {
            warn!("{} (skipping)", ProbeError::Input("empty port token".into()));
            continue;
        }

        if let Some((low, high)) = token.split_once('-') {
            let (low, high) = match (parse_port(low), parse_port(high)) {
                (Ok(low), Ok(high)) => (low, high),
                (Err(e), _) | (_, Err(e)) => {
                    warn!("{e} (skipping)");
                    continue;
                }
            };
            let (start, end) = if low > high { (high, low) } else { (low, high) };
            ports.extend(start..=end);
        } else {
            match parse_port(token) {
                Ok(port) => ports.push(port),
                Err(e) => warn!("{e} (skipping)"),
            }
        }
    }

    ports
}

fn parse_port(token: &str) -> Result<u16, ProbeError> {
    let token = token.trim();
    let n: u32 = token
        .parse()
        .map_err(|_| ProbeError::Input(format!("invalid port '{token}'")))?;
    if (MIN_PORT..=MAX_PORT).contains(&n) {
        Ok(n as u16)
    } else {
        Err(ProbeError::Input(format!(
            "port {n} out of valid range ({MIN_PORT}-{MAX_PORT})"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_singles_and_ranges() {
        let ports = parse_port_spec("80,443,8000-8100");
        assert_eq!(ports.len(), 103);
        assert_eq!(ports[0], 80);
        assert_eq!(ports[1], 443);
        assert_eq!(ports[2], 8000);
        assert_eq!(*ports.last().unwrap(), 8100);
        assert!(ports.iter().all(|p| (1..=65535).contains(p)));
    }

    #[test]
    fn parsing_is_idempotent() {
        assert_eq!(
            parse_port_spec("80,443,8000-8100"),
            parse_port_spec("80,443,8000-8100")
        );
    }

    #[test]
    fn reversed_range_is_swapped() {
        assert_eq!(parse_port_spec("443-80"), parse_port_spec("80-443"));
    }

    #[test]
    fn bad_tokens_never_poison_the_rest() {
        assert_eq!(parse_port_spec("abc,22,0,99999,80-,443"), vec![22, 443]);
    }

    #[test]
    fn rejected_tokens_carry_the_input_error() {
        assert!(matches!(parse_port("abc"), Err(ProbeError::Input(_))));
        assert!(matches!(parse_port("0"), Err(ProbeError::Input(_))));
        assert!(matches!(parse_port("99999"), Err(ProbeError::Input(_))));
        assert!(matches!(parse_port(""), Err(ProbeError::Input(_))));
    }

    #[test]
    fn whitespace_around_tokens_is_tolerated() {
        assert_eq!(parse_port_spec(" 22 , 80 - 82 "), vec![22, 80, 81, 82]);
    }

    #[test]
    fn duplicates_are_preserved() {
        assert_eq!(parse_port_spec("80,79-81"), vec![80, 79, 80, 81]);
    }

    #[test]
    fn empty_spec_yields_nothing() {
        assert!(parse_port_spec("").is_empty());
        assert!(parse_port_spec(",,").is_empty());
    }
}
