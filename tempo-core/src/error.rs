use thiserror::Error;

/// Errors raised while building a [`SessionConfig`](crate::SessionConfig).
///
/// The clock itself never fails; the only way to get an error out of this
/// crate is to hand it a configuration it cannot run with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration for `{key}`: {reason}")]
    InvalidConfiguration { key: String, reason: String },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
