/// §7 `ConfigError`: malformed or missing required field. Fatal at
/// startup; logged and ignored (previous config retained) during
/// hot-reload.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid duration {value:?} for field {field}: {source}")]
    Duration {
        field: String,
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("pool {partition}/{name} references undefined mode {mode_name:?}")]
    UndefinedMode {
        partition: String,
        name: String,
        mode_name: String,
    },

    #[error(
        "pool {partition}/{name} uses algorithm {algorithm:?} which requires parameter {parameter}"
    )]
    MissingAlgorithmParameter {
        partition: String,
        name: String,
        algorithm: String,
        parameter: &'static str,
    },

    #[error("pool {partition}/{name} has unknown algorithm {algorithm:?}")]
    UnknownAlgorithm {
        partition: String,
        name: String,
        algorithm: String,
    },

    #[error("pool {partition}/{name} has unknown engine_type {engine_type:?}")]
    UnknownEngine {
        partition: String,
        name: String,
        engine_type: String,
    },

    #[error("pool {partition}/{name} has unknown metrics schema {schema:?}")]
    UnknownScheme {
        partition: String,
        name: String,
        schema: String,
    },

    #[error("required secret env var {env_var} (for {purpose}) is not set")]
    MissingSecret { env_var: String, purpose: String },

    #[error("duplicate pool {partition}/{name} in configuration")]
    DuplicatePool { partition: String, name: String },
}
