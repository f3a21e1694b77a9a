use std::env;
use std::fs as stdfs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOCAL_ENV_PATH: &str = "config/local.env";

/// Export `config/local.env` entries that are not already set.
///
/// Runs before logging is up, so the outcome is returned for the caller
/// to report.
pub fn load_local_env_overrides() -> std::io::Result<usize> {
    let path = Path::new(LOCAL_ENV_PATH);
    if !path.exists() {
        return Ok(0);
    }

    let contents = stdfs::read_to_string(path)?;
    let mut applied = 0;
    for (key, value) in parse_env_lines(&contents) {
        if env::var(&key).is_ok() {
            continue;
        }
        env::set_var(key, value);
        applied += 1;
    }
    Ok(applied)
}

/// `KEY=VALUE` pairs; blank lines and `#` comments are skipped.
fn parse_env_lines(contents: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        pairs.push((key.to_string(), unescape_value(value.trim())));
    }
    pairs
}

/// Logs go to stderr so structured output on stdout stays parseable.
pub fn init_logging(level: &str, debug: bool, json: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    Ok(())
}

fn unescape_value(value: &str) -> String {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        let inner = &value[1..value.len() - 1];
        inner
            .replace("\\\"", "\"")
            .replace("\\n", "\n")
            .replace("\\r", "\r")
            .replace("\\t", "\t")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_lines_skip_comments_and_unquote() {
        let pairs = parse_env_lines(
            "# local secrets\nPAGESPEED_API_KEY=\"abc\\n\"\n\nbroken line\n=orphan\nRUST_LOG=debug\n",
        );
        assert_eq!(
            pairs,
            vec![
                ("PAGESPEED_API_KEY".to_string(), "abc\n".to_string()),
                ("RUST_LOG".to_string(), "debug".to_string()),
            ]
        );
    }
}
