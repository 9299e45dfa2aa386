use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use crate::config::CollectionConfig;
use crate::constants::{ENV_COMPRESSION_LEVEL, ENV_CONCURRENCY, ENV_OUTPUT_DIR};

/// Expand `%VAR%`, `${VAR}` and `$VAR` references using the process
/// environment. Unknown variables are left as written.
pub fn expand_env_vars(value: &str) -> String {
    expand_with(value, |name| std::env::var(name).ok())
}

fn expand_with<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(pos) = rest.find(&['%', '$'][..]) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let (name, consumed) = if let Some(inner) = tail.strip_prefix('%') {
            match inner.find('%') {
                Some(end) if end > 0 => (&inner[..end], end + 2),
                _ => ("", 0),
            }
        } else if let Some(inner) = tail.strip_prefix("${") {
            match inner.find('}') {
                Some(end) if end > 0 => (&inner[..end], end + 3),
                _ => ("", 0),
            }
        } else {
            let inner = &tail[1..];
            let end = inner
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(inner.len());
            (&inner[..end], end + 1)
        };

        match (consumed, lookup(name)) {
            (n, Some(value)) if n > 0 && !name.is_empty() => {
                out.push_str(&value);
                rest = &tail[n..];
            }
            (n, _) if n > 0 && !name.is_empty() => {
                out.push_str(&tail[..n]);
                rest = &tail[n..];
            }
            _ => {
                // Lone marker
                out.push_str(&tail[..1]);
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Apply `PROJECT_COLLECTOR_*` overrides, then expand variables in
/// `output_dir`.
pub fn apply_env_overrides(config: &mut CollectionConfig) -> Result<()> {
    apply_overrides_from(config, |name| std::env::var(name).ok())
}

fn apply_overrides_from<F>(config: &mut CollectionConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
        info!("Output directory overridden by {}", ENV_OUTPUT_DIR);
        config.output_dir = Some(PathBuf::from(dir));
    }

    if let Some(raw) = lookup(ENV_CONCURRENCY) {
        config.copy_concurrency = raw.trim().parse()
            .context(format!("{} must be a positive integer, got {:?}", ENV_CONCURRENCY, raw))?;
    }

    if let Some(raw) = lookup(ENV_COMPRESSION_LEVEL) {
        config.compression_level = raw.trim().parse()
            .context(format!("{} must be an integer, got {:?}", ENV_COMPRESSION_LEVEL, raw))?;
    }

    let expanded = config.output_dir.as_ref()
        .map(|dir| dir.to_string_lossy().to_string())
        .filter(|raw| raw.contains(&['%', '$'][..]))
        .map(|raw| PathBuf::from(expand_with(&raw, &lookup)));
    if expanded.is_some() {
        config.output_dir = expanded;
    }

    Ok(())
}
