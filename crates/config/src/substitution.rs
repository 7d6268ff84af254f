use anyhow::Result;
use regex::{Captures, Regex};
use std::env;
use tracing::{debug, warn};

const PLACEHOLDER: &str = r"\$\{(\w+)\}|\$(\w+)";

fn placeholder_regex() -> Result<Regex> {
    Ok(Regex::new(PLACEHOLDER)?)
}

fn var_name<'c>(caps: &Captures<'c>) -> &'c str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

/// Substitute environment variables in the format ${VAR_NAME} or $VAR_NAME
///
/// Unset variables keep their placeholder; the validator reports them.
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = placeholder_regex()?;
    let mut missing_vars = Vec::new();

    let result = re.replace_all(content, |caps: &Captures<'_>| {
        let name = var_name(caps);
        match env::var(name) {
            Ok(value) => {
                // Values are often secrets; log the name only.
                debug!("Substituting environment variable: {}", name);
                value
            }
            Err(_) => {
                warn!("Environment variable '{}' not set", name);
                missing_vars.push(name.to_string());
                caps[0].to_string()
            }
        }
    });

    if !missing_vars.is_empty() {
        debug!(
            "Environment variables not set (may fail validation): {:?}",
            missing_vars
        );
    }

    Ok(result.into_owned())
}

/// Names of the placeholders still present in `content`.
pub fn unresolved_env_vars(content: &str) -> Vec<String> {
    match placeholder_regex() {
        Ok(re) => re
            .captures_iter(content)
            .map(|caps| var_name(&caps).to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Check if a string contains unresolved environment variable placeholders
pub fn has_unresolved_env_vars(content: &str) -> bool {
    !unresolved_env_vars(content).is_empty()
}
