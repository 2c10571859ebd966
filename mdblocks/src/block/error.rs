use thiserror::Error;

/// Reasons the host refuses a block occurrence.
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("block '{block}' requires an argument")]
    MissingArgument { block: &'static str },

    #[error("block '{block}' does not take an argument")]
    UnexpectedArgument { block: &'static str },

    #[error("invalid argument for block '{block}': '{argument}'")]
    InvalidArgument { block: &'static str, argument: String },

    #[error("block '{block}' has no option '{option}'")]
    UnknownOption { block: &'static str, option: String },

    #[error("option '{option}' of block '{block}' must be one of {allowed}, got '{value}'")]
    OptionNotAllowed {
        block: &'static str,
        option: String,
        value: String,
        allowed: String,
    },

    #[error("option '{option}' of block '{block}' must be a string")]
    OptionNotText { block: &'static str, option: String },

    #[error("malformed options for block '{block}': {source}")]
    MalformedOptions {
        block: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("options for block '{block}' must be a mapping")]
    OptionsNotMapping { block: &'static str },
}
