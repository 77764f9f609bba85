//! Filter predicates and view configuration.
//!
//! Four predicate groups decide whether a record is visible:
//! - search: any configured field contains the search term
//! - status: one field equals the status control exactly
//! - additional: named filters with their own matcher
//! - column: per-field filters, text (substring) or dual (enum or substring)
//!
//! Groups combine with AND. A group (or a constraint within it) that has no
//! value set passes every record.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::{Record, Value};

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

// =============================================================================
// FilterSpec: one active constraint
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    ExactMatch,
    Contains,
}

/// One constraint against one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub field: String,
    pub predicate: Predicate,
    pub value: String,
    pub case_sensitive: bool,
}

impl FilterSpec {
    pub fn exact(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            predicate: Predicate::ExactMatch,
            value: value.into(),
            case_sensitive: true,
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            predicate: Predicate::Contains,
            value: value.into(),
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Test the record's value at `field`.
    ///
    /// RULE: a missing or blank value never matches.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(value) = record.present_path(&self.field) else {
            return false;
        };
        self.matches_text(&value.display_string())
    }

    pub fn matches_text(&self, text: &str) -> bool {
        if self.case_sensitive {
            self.compare(text, &self.value)
        } else {
            self.compare(&text.to_lowercase(), &self.value.to_lowercase())
        }
    }

    fn compare(&self, haystack: &str, needle: &str) -> bool {
        match self.predicate {
            Predicate::ExactMatch => haystack == needle,
            Predicate::Contains => haystack.contains(needle),
        }
    }
}

// =============================================================================
// Additional filters
// =============================================================================

/// Injected predicate: `(record value, control value) -> keep?`
pub type CustomMatcher = Arc<dyn Fn(Option<&Value>, &str) -> bool + Send + Sync>;

/// Named numeric range for the bucket matcher.
///
/// Bounds are `min <= n < max`; a missing bound is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Bucket {
    pub fn new(name: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    pub fn contains(&self, n: f64) -> bool {
        self.min.map_or(true, |min| n >= min) && self.max.map_or(true, |max| n < max)
    }
}

/// How an additional filter compares a record value to its control value.
#[derive(Clone, Default)]
pub enum Matcher {
    /// Stringified value equals the control value exactly
    #[default]
    Equals,
    /// Control value names a bucket; the record's number must fall inside it.
    /// An unknown bucket name passes every record.
    Buckets(Vec<Bucket>),
    Custom(CustomMatcher),
}

impl Matcher {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>, &str) -> bool + Send + Sync + 'static,
    {
        Matcher::Custom(Arc::new(f))
    }

    pub fn matches(&self, value: Option<&Value>, control: &str) -> bool {
        match self {
            Matcher::Equals => value
                .filter(|v| !v.is_blank())
                .map_or(false, |v| v.display_string() == control),
            Matcher::Buckets(buckets) => match buckets.iter().find(|b| b.name == control) {
                Some(bucket) => value
                    .and_then(Value::as_number)
                    .map_or(false, |n| bucket.contains(n)),
                None => true,
            },
            Matcher::Custom(f) => f(value, control),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Equals => f.write_str("Equals"),
            Matcher::Buckets(b) => f.debug_tuple("Buckets").field(b).finish(),
            Matcher::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// An exact-match style filter bound to a field, driven by a named control.
#[derive(Debug, Clone)]
pub struct AdditionalFilter {
    pub key: String,
    pub field: String,
    pub matcher: Matcher,
}

impl AdditionalFilter {
    pub fn new(key: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            field: field.into(),
            matcher: Matcher::Equals,
        }
    }

    pub fn with_matcher(mut self, matcher: Matcher) -> Self {
        self.matcher = matcher;
        self
    }
}

// =============================================================================
// Column filters
// =============================================================================

/// Per-column filter declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilterSpec {
    pub field: String,
    /// Dual filter: one input acts as both a dropdown of `options` and a
    /// free-text box
    #[serde(default)]
    pub dual: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

impl ColumnFilterSpec {
    pub fn text(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dual: false,
            options: Vec::new(),
        }
    }

    pub fn dual<I, S>(field: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            dual: true,
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Declared option matching `value` case-insensitively (dual only)
    pub fn matching_option(&self, value: &str) -> Option<&str> {
        if !self.dual {
            return None;
        }
        let value = value.to_lowercase();
        self.options
            .iter()
            .find(|opt| opt.to_lowercase() == value)
            .map(String::as_str)
    }

    /// Resolve a stored (lowercased) value into the constraint it stands for
    pub fn resolve(&self, stored: &str) -> FilterSpec {
        column_spec(Some(self), &self.field, stored)
    }
}

/// Build the constraint for a stored column value.
///
/// Dual columns whose options contain the value filter by equality;
/// everything else (including undeclared columns) filters by substring.
pub(crate) fn column_spec(config: Option<&ColumnFilterSpec>, field: &str, stored: &str) -> FilterSpec {
    let exact = config.map_or(false, |c| c.matching_option(stored).is_some());
    let spec = if exact {
        FilterSpec::exact(field, stored)
    } else {
        FilterSpec::contains(field, stored)
    };
    spec.case_sensitive(false)
}

/// Which half of a dual input should display a newly set column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DualInputSync {
    /// Value is a declared option: select it in the dropdown, clear the text box
    Dropdown(String),
    /// Free text: clear the dropdown, keep the text in the text box
    Text(String),
}

// =============================================================================
// FilterConfig
// =============================================================================

/// Construction-time configuration for a table view.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Dot-paths scanned by free-text search
    pub search_fields: Vec<String>,
    /// Field compared against the status control
    pub status_field: Option<String>,
    pub additional_filters: Vec<AdditionalFilter>,
    pub column_filters: Vec<ColumnFilterSpec>,
    pub page_size: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            search_fields: Vec::new(),
            status_field: None,
            additional_filters: Vec::new(),
            column_filters: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn status_field(mut self, field: impl Into<String>) -> Self {
        self.status_field = Some(field.into());
        self
    }

    pub fn additional_filter(mut self, filter: AdditionalFilter) -> Self {
        self.additional_filters.push(filter);
        self
    }

    pub fn column_filter(mut self, column: ColumnFilterSpec) -> Self {
        self.column_filters.push(column);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn column(&self, field: &str) -> Option<&ColumnFilterSpec> {
        self.column_filters.iter().find(|c| c.field == field)
    }

    pub fn additional(&self, key: &str) -> Option<&AdditionalFilter> {
        self.additional_filters.iter().find(|f| f.key == key)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_spec_contains_ignores_case() {
        let spec = FilterSpec::contains("name", "ac");
        assert!(spec.matches(&Record::new().with("name", "Acme")));
        assert!(spec.matches(&Record::new().with("name", "BACK")));
        assert!(!spec.matches(&Record::new().with("name", "Bob")));
    }

    #[test]
    fn test_filter_spec_exact_case_sensitive() {
        let spec = FilterSpec::exact("status", "active");
        assert!(spec.matches(&Record::new().with("status", "active")));
        assert!(!spec.matches(&Record::new().with("status", "Active")));
        assert!(!spec.matches(&Record::new().with("status", "inactive")));
    }

    #[test]
    fn test_filter_spec_missing_value_fails() {
        let spec = FilterSpec::contains("name", "");
        assert!(!spec.matches(&Record::new()));
        assert!(!spec.matches(&Record::new().with("name", Value::Null)));
        assert!(!spec.matches(&Record::new().with("name", "")));
    }

    #[test]
    fn test_filter_spec_numbers_stringify() {
        let spec = FilterSpec::contains("orders", "2");
        assert!(spec.matches(&Record::new().with("orders", 25)));
        assert!(!spec.matches(&Record::new().with("orders", 7)));
    }

    #[test]
    fn test_bucket_matcher() {
        let matcher = Matcher::Buckets(vec![
            Bucket::new("high", Some(20.0), None),
            Bucket::new("medium", Some(10.0), Some(20.0)),
            Bucket::new("low", None, Some(10.0)),
        ]);
        let n = |x: f64| Value::Number(x);

        assert!(matcher.matches(Some(&n(25.0)), "high"));
        assert!(matcher.matches(Some(&n(20.0)), "high"));
        assert!(!matcher.matches(Some(&n(19.0)), "high"));
        assert!(matcher.matches(Some(&n(10.0)), "medium"));
        assert!(matcher.matches(Some(&n(3.0)), "low"));
        assert!(!matcher.matches(None, "low"));
        assert!(!matcher.matches(Some(&Value::from("many")), "high"));

        // Unknown bucket passes everything
        assert!(matcher.matches(Some(&n(3.0)), "huge"));
        assert!(matcher.matches(None, "huge"));
    }

    #[test]
    fn test_equals_matcher() {
        let m = Matcher::Equals;
        assert!(m.matches(Some(&Value::from("Bay 3")), "Bay 3"));
        assert!(!m.matches(Some(&Value::from("bay 3")), "Bay 3"));
        assert!(m.matches(Some(&Value::Number(3.0)), "3"));
        assert!(!m.matches(None, "3"));
    }

    #[test]
    fn test_custom_matcher() {
        let m = Matcher::custom(|v, control| {
            let prefix = control.to_uppercase();
            v.and_then(Value::as_text).map_or(false, |s| s.starts_with(&prefix))
        });
        assert!(m.matches(Some(&Value::from("INV-001")), "inv"));
        assert!(!m.matches(Some(&Value::from("CRN-001")), "inv"));
        assert_eq!(format!("{:?}", m), "Custom(..)");
    }

    #[test]
    fn test_dual_column_resolution() {
        let col = ColumnFilterSpec::dual("status", ["Active", "Inactive"]);

        let exact = col.resolve("active");
        assert_eq!(exact.predicate, Predicate::ExactMatch);
        assert!(exact.matches(&Record::new().with("status", "Active")));
        assert!(!exact.matches(&Record::new().with("status", "Inactive")));

        let partial = col.resolve("act");
        assert_eq!(partial.predicate, Predicate::Contains);
        assert!(partial.matches(&Record::new().with("status", "Active")));
        assert!(partial.matches(&Record::new().with("status", "Inactive")));
    }

    #[test]
    fn test_text_column_never_exact() {
        let col = ColumnFilterSpec {
            field: "status".into(),
            dual: false,
            options: vec!["Active".into()],
        };
        assert_eq!(col.matching_option("active"), None);
        assert_eq!(col.resolve("active").predicate, Predicate::Contains);
        assert_eq!(column_spec(None, "x", "y").predicate, Predicate::Contains);
    }

    #[test]
    fn test_config_lookup() {
        let config = FilterConfig::new()
            .search_fields(["name", "customer.email"])
            .status_field("status")
            .additional_filter(AdditionalFilter::new("bay", "bay.code"))
            .column_filter(ColumnFilterSpec::text("name"))
            .page_size(25);

        assert_eq!(config.search_fields, vec!["name", "customer.email"]);
        assert_eq!(config.page_size, 25);
        assert!(config.column("name").is_some());
        assert!(config.column("phone").is_none());
        assert_eq!(config.additional("bay").map(|f| f.field.as_str()), Some("bay.code"));
        assert_eq!(FilterConfig::default().page_size, DEFAULT_PAGE_SIZE);
    }
}
