// View configuration loading

pub mod error;
pub mod view;

pub use error::ConfigError;
pub use view::{AdditionalFilterConfig, MatcherConfig, ViewConfig};
