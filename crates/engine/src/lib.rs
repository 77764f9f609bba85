//! `tabview-engine` - filtered, sorted, paginated views over in-memory records.
//!
//! Pure engine crate: the host supplies records and current control values,
//! the engine answers which records are visible and calls render hooks.

pub mod engine;
pub mod error;
pub mod events;
pub mod filter;
pub mod page;
pub mod sort;
pub mod value;

pub use engine::{DistinctValue, TableFilterEngine};
pub use error::EngineError;
pub use events::{EventCollector, ViewEvent, ViewHooks};
pub use filter::{
    AdditionalFilter, Bucket, ColumnFilterSpec, DualInputSync, FilterConfig, FilterSpec, Matcher, Predicate,
    DEFAULT_PAGE_SIZE,
};
pub use page::PaginationInfo;
pub use sort::{SortDirection, SortState};
pub use value::{Record, Value};
