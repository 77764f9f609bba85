use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// TOML parse / deserialization error.
    Parse(String),
    /// TOML serialization error.
    Serialize(String),
    /// Semantic validation error (bad page size, empty field path, ...).
    Validation(String),
    /// A name that must be unique appears twice.
    Duplicate { section: &'static str, name: String },
    /// File read/write error.
    Io { path: String, message: String },
    /// Platform has no user config directory.
    NoConfigDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "view config parse error: {msg}"),
            Self::Serialize(msg) => write!(f, "view config serialize error: {msg}"),
            Self::Validation(msg) => write!(f, "view config validation error: {msg}"),
            Self::Duplicate { section, name } => write!(f, "{section}: duplicate entry '{name}'"),
            Self::Io { path, message } => write!(f, "{path}: {message}"),
            Self::NoConfigDir => write!(f, "no user configuration directory available"),
        }
    }
}

impl std::error::Error for ConfigError {}
