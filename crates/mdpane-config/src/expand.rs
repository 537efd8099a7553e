//! `${VAR}` and `~` expansion for the string settings of `mdpane.toml`.
//!
//! Only `diagrams.kroki_url` and `state.dir` are expanded. A reference to an
//! unset variable without a `:-fallback` is a config error naming the field.

use std::borrow::Cow;

use crate::ConfigError;

/// What a setting expands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expansion {
    /// `${VAR}` and `${VAR:-fallback}` references.
    Env,
    /// Env references, then a leading `~`.
    Path,
}

/// Expand `value` of the setting `field`.
///
/// Bare `$VAR` is kept as written.
pub(crate) fn expand(value: &str, field: &str, expansion: Expansion) -> Result<String, ConfigError> {
    let value = if value.contains("${") {
        Cow::Owned(env_refs(value, field)?)
    } else {
        Cow::Borrowed(value)
    };

    Ok(match expansion {
        Expansion::Env => value.into_owned(),
        Expansion::Path => shellexpand::tilde(&value).into_owned(),
    })
}

fn env_refs(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(value, |name| match std::env::var(name) {
        Ok(found) => Ok(Some(found)),
        Err(_) => Err(Unset(name.to_owned())),
    })
    .map(Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a referenced variable missing from the environment.
struct Unset(String);
