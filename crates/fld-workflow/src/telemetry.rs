//! `tracing` subscriber bootstrap for hosts embedding the workflow.

/// Install a `fmt` subscriber.
///
/// The filter comes from `FIELDLINE_LOG` when set, otherwise from
/// `default_filter` (typically `general.log_filter` from the config).
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("FIELDLINE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails_instead_of_panicking() {
        let _ = init_tracing("warn");
        assert!(init_tracing("debug").is_err());
    }
}
