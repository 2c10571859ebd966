use std::path::PathBuf;

use thiserror::Error;

/// Process exit codes.
pub struct ExitCode;

impl ExitCode {
    /// A page failed to render (block errors, or any diagnostic in strict mode).
    pub const RENDER_ERROR: i32 = 1;

    /// Invalid YAML or a configuration validation failure.
    pub const CONFIG_ERROR: i32 = 2;

    pub const IO_ERROR: i32 = 3;

    /// Invalid arguments, or no configuration file to work from.
    pub const USAGE_ERROR: i32 = 64;
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to find a 'mkdocs.yml' configuration file")]
    NotFound,

    #[error("configuration file '{}' does not exist or is not a file", path.display())]
    NotAFile { path: PathBuf },

    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in '{origin}': {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("'{origin}' must contain a mapping at the top level")]
    NotMapping { origin: String },

    #[error("cannot merge '{key}': the project value is not a list")]
    NotAList { key: String },

    #[error("Aborted with a configuration error!")]
    Aborted,

    #[error("Aborted with {0} configuration warnings in 'strict' mode!")]
    StrictWarnings(usize),

    #[error("cannot serialize configuration: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{failed} page(s) failed to render")]
    Render { failed: usize },
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(ConfigError::NotFound | ConfigError::NotAFile { .. }) => {
                ExitCode::USAGE_ERROR
            }
            CliError::Config(ConfigError::Read { .. }) | CliError::Io { .. } => ExitCode::IO_ERROR,
            CliError::Config(_) => ExitCode::CONFIG_ERROR,
            CliError::Render { .. } => ExitCode::RENDER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(CliError::from(ConfigError::NotFound).exit_code(), ExitCode::USAGE_ERROR);
        assert_eq!(CliError::from(ConfigError::Aborted).exit_code(), ExitCode::CONFIG_ERROR);
        assert_eq!(
            CliError::io("site", std::io::Error::other("denied")).exit_code(),
            ExitCode::IO_ERROR
        );
        assert_eq!(CliError::Render { failed: 2 }.exit_code(), ExitCode::RENDER_ERROR);
    }

    #[test]
    fn messages() {
        assert_eq!(
            ConfigError::StrictWarnings(3).to_string(),
            "Aborted with 3 configuration warnings in 'strict' mode!"
        );
        assert_eq!(
            ConfigError::NotFound.to_string(),
            "Unable to find a 'mkdocs.yml' configuration file"
        );
    }
}
