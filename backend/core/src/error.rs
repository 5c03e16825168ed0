use thiserror::Error;

/// Top-level error type for hook installation and stage assembly.
#[derive(Debug, Error)]
pub enum HookError {
    /// An install call was handed an empty callback. The slot keeps its prior value.
    #[error("invalid configuration: {slot} hook must not be empty")]
    InvalidConfiguration { slot: &'static str },

    /// A creation hook returned no value for a stage under construction.
    #[error("misconfigured hook: creation hook returned no value while assembling {stage}")]
    MisconfiguredHook { stage: String },

    /// The boot configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = HookError::InvalidConfiguration { slot: "creation" };
        assert_eq!(err.to_string(), "invalid configuration: creation hook must not be empty");

        let err = HookError::MisconfiguredHook { stage: "MultiMap".into() };
        assert!(err.to_string().contains("MultiMap"));

        let err = HookError::Config("bad yaml".into());
        assert_eq!(err.to_string(), "configuration error: bad yaml");
    }
}
