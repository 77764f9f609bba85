//! TableFilterEngine - filtered, sorted, paginated view over a record set.
//!
//! The engine keeps a row view over the caller's records:
//! - `records` is the canonical data, never mutated, replaced wholesale
//! - `rows` holds indices into `records` that pass every filter, in view order
//!
//! Key invariants:
//! - `rows` is a subset of `0..records.len()` with no duplicates
//! - every filter run leaves `rows` in data order; only `sort_data` reorders
//! - stored column filter values are lowercased on write
//! - `current_page >= 1` and `page_size >= 1`
//!
//! Control values (search box, status dropdown, ...) are injected through
//! setters; the engine never reads UI state.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::error::EngineError;
use crate::events::ViewHooks;
use crate::filter::{column_spec, AdditionalFilter, DualInputSync, FilterConfig, FilterSpec, Predicate};
use crate::page::{page_range, total_pages, PaginationInfo};
use crate::sort::{sort_rows, SortDirection, SortState};
use crate::value::{Record, Value};

/// Current values of the host's filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Controls {
    search: String,
    status: String,
    /// Additional filter key -> control value
    additional: FxHashMap<String, String>,
}

/// Active constraints resolved once per filter run.
///
/// Lowercasing and dual-option lookups happen here, not per record.
struct RowFilter<'a> {
    search_fields: &'a [String],
    /// Lowercased term; None when blank
    search: Option<String>,
    /// (field, exact value)
    status: Option<(&'a str, &'a str)>,
    additional: Vec<(&'a AdditionalFilter, &'a str)>,
    /// (field, predicate, lowercased value)
    columns: Vec<(&'a str, Predicate, &'a str)>,
}

impl<'a> RowFilter<'a> {
    fn new(config: &'a FilterConfig, controls: &'a Controls, column_filters: &'a BTreeMap<String, String>) -> Self {
        let search = (!controls.search.trim().is_empty()).then(|| controls.search.to_lowercase());
        let status = config
            .status_field
            .as_deref()
            .filter(|_| !controls.status.is_empty())
            .map(|field| (field, controls.status.as_str()));
        let additional = config
            .additional_filters
            .iter()
            .filter_map(|filter| match controls.additional.get(&filter.key) {
                Some(control) if !control.is_empty() => Some((filter, control.as_str())),
                _ => None,
            })
            .collect();
        let columns = column_filters
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(field, value)| {
                let exact = config
                    .column(field)
                    .map_or(false, |c| c.matching_option(value).is_some());
                let predicate = if exact { Predicate::ExactMatch } else { Predicate::Contains };
                (field.as_str(), predicate, value.as_str())
            })
            .collect();
        Self {
            search_fields: &config.search_fields,
            search,
            status,
            additional,
            columns,
        }
    }

    fn matches(&self, record: &Record) -> bool {
        self.search(record) && self.status(record) && self.additional(record) && self.columns(record)
    }

    fn search(&self, record: &Record) -> bool {
        let Some(term) = &self.search else {
            return true;
        };
        self.search_fields.iter().any(|field| {
            record
                .present_path(field)
                .map_or(false, |v| v.display_string().to_lowercase().contains(term.as_str()))
        })
    }

    fn status(&self, record: &Record) -> bool {
        let Some((field, status)) = self.status else {
            return true;
        };
        record.present_path(field).map_or(false, |v| v.display_string() == status)
    }

    fn additional(&self, record: &Record) -> bool {
        self.additional
            .iter()
            .all(|(filter, control)| filter.matcher.matches(record.get_path(&filter.field), control))
    }

    fn columns(&self, record: &Record) -> bool {
        self.columns.iter().all(|&(field, predicate, value)| {
            let Some(v) = record.present_path(field) else {
                return false;
            };
            let text = v.display_string().to_lowercase();
            match predicate {
                Predicate::ExactMatch => text == value,
                Predicate::Contains => text.contains(value),
            }
        })
    }
}

/// Distinct value of a field with its frequency in the filtered view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinctValue {
    /// Case-folded value used for grouping
    pub key: String,
    /// First-seen original spelling
    pub display: String,
    pub count: usize,
}

#[derive(Debug)]
pub struct TableFilterEngine {
    config: FilterConfig,
    hooks: ViewHooks,
    records: Vec<Record>,
    rows: Vec<usize>,
    controls: Controls,
    /// Field -> lowercased filter value
    column_filters: BTreeMap<String, String>,
    current_page: usize,
    page_size: usize,
    sort: Option<SortState>,
}

impl TableFilterEngine {
    /// Build an unfiltered view over `records`.
    ///
    /// No hooks fire; call `apply_filters` for the first render.
    pub fn new(records: Vec<Record>, config: FilterConfig, hooks: ViewHooks) -> Result<Self, EngineError> {
        if config.page_size == 0 {
            return Err(EngineError::InvalidPageSize(0));
        }
        let page_size = config.page_size;
        Ok(Self {
            config,
            hooks,
            rows: (0..records.len()).collect(),
            records,
            controls: Controls::default(),
            column_filters: BTreeMap::new(),
            current_page: 1,
            page_size,
            sort: None,
        })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Control inputs
    // -------------------------------------------------------------------------

    /// Set the free-text search term and re-filter
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.controls.search = term.into();
        self.apply_filters();
    }

    /// Set the status control value and re-filter
    pub fn set_status(&mut self, value: impl Into<String>) {
        self.controls.status = value.into();
        self.apply_filters();
    }

    /// Set an additional filter's control value and re-filter.
    ///
    /// Keys with no matching configuration are stored but never constrain.
    pub fn set_additional_filter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.controls.additional.insert(key.into(), value.into());
        self.apply_filters();
    }

    /// Set a column filter and re-filter.
    ///
    /// The value is stored lowercased. For dual columns, returns which input
    /// should display it: the dropdown when it names a declared option,
    /// otherwise the text box.
    pub fn set_column_filter(&mut self, field: &str, raw: &str) -> Option<DualInputSync> {
        self.column_filters.insert(field.to_string(), raw.to_lowercase());
        self.apply_filters();

        let column = self.config.column(field).filter(|c| c.dual)?;
        Some(match column.matching_option(raw) {
            Some(option) => DualInputSync::Dropdown(option.to_string()),
            None => DualInputSync::Text(raw.to_string()),
        })
    }

    /// Remove one column's filter and re-filter
    pub fn clear_column_filter(&mut self, field: &str) {
        if self.column_filters.remove(field).is_some() {
            self.apply_filters();
        }
    }

    pub fn search(&self) -> &str {
        &self.controls.search
    }

    pub fn status(&self) -> &str {
        &self.controls.status
    }

    pub fn additional_filter(&self, key: &str) -> Option<&str> {
        self.controls.additional.get(key).map(String::as_str)
    }

    /// Stored (lowercased) column filter value
    pub fn column_filter(&self, field: &str) -> Option<&str> {
        self.column_filters.get(field).map(String::as_str)
    }

    /// Non-empty column filters resolved to the constraint each applies
    pub fn active_filters(&self) -> Vec<FilterSpec> {
        self.column_filters
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(field, value)| column_spec(self.config.column(field), field, value))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Filter pipeline
    // -------------------------------------------------------------------------

    /// Recompute the visible rows from the full record set.
    ///
    /// Rows come back in data order and the page resets to 1. The sort
    /// state is kept, so the next `sort_data` on the same field toggles.
    /// Fires the display, pagination and filter-change hooks.
    pub fn apply_filters(&mut self) {
        self.current_page = 1;
        let filter = RowFilter::new(&self.config, &self.controls, &self.column_filters);
        self.rows = (0..self.records.len())
            .filter(|&i| filter.matches(&self.records[i]))
            .collect();

        log::debug!(
            "filters applied: {} of {} records visible",
            self.rows.len(),
            self.records.len()
        );

        self.render();
        self.notify_pagination();
        let filtered: Vec<&Record> = self.rows.iter().map(|&i| &self.records[i]).collect();
        self.hooks.filter_change(&filtered);
    }

    /// All four predicate groups, ANDed
    pub fn matches(&self, record: &Record) -> bool {
        self.row_filter().matches(record)
    }

    fn row_filter(&self) -> RowFilter<'_> {
        RowFilter::new(&self.config, &self.controls, &self.column_filters)
    }

    /// True when the search is blank, or any search field contains the term.
    pub fn matches_search(&self, record: &Record) -> bool {
        self.row_filter().search(record)
    }

    /// True when no status field or value is set, or the status equals it exactly.
    pub fn matches_status(&self, record: &Record) -> bool {
        self.row_filter().status(record)
    }

    /// Every configured additional filter with a control value must accept.
    pub fn matches_additional(&self, record: &Record) -> bool {
        self.row_filter().additional(record)
    }

    /// Every non-empty column filter must hold.
    pub fn matches_column_filters(&self, record: &Record) -> bool {
        self.row_filter().columns(record)
    }

    /// Clear every control and column filter, then re-filter.
    ///
    /// The sort state survives; rows return to data order.
    pub fn reset_filters(&mut self) {
        self.controls = Controls::default();
        self.column_filters.clear();
        self.apply_filters();
    }

    // -------------------------------------------------------------------------
    // Sort
    // -------------------------------------------------------------------------

    /// Sort the visible rows by `field`.
    ///
    /// Repeating the current field without a direction toggles it. Keeps the
    /// current page and does not re-run filters.
    pub fn sort_data(&mut self, field: &str, direction: Option<SortDirection>) {
        let state = SortState::next(self.sort.as_ref(), field, direction);
        log::trace!("sort by {} {:?}", state.field, state.direction);
        sort_rows(&mut self.rows, &self.records, &state);
        self.sort = Some(state);
        self.render();
    }

    /// Drop the sort and restore data order for the visible rows
    pub fn clear_sort(&mut self) {
        if self.sort.take().is_some() {
            self.rows.sort_unstable();
            self.render();
        }
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    // -------------------------------------------------------------------------
    // Paging
    // -------------------------------------------------------------------------

    /// Move to `page`. Pages outside `1..=total_pages` are ignored.
    ///
    /// Returns true when the page changed.
    pub fn change_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            log::trace!("page {} out of range (1..={})", page, self.total_pages());
            return false;
        }
        self.current_page = page;
        self.render();
        self.notify_pagination();
        true
    }

    /// Set rows per page and return to page 1.
    pub fn change_page_size(&mut self, page_size: usize) -> Result<(), EngineError> {
        if page_size == 0 {
            return Err(EngineError::InvalidPageSize(page_size));
        }
        self.page_size = page_size;
        self.current_page = 1;
        self.render();
        self.notify_pagination();
        Ok(())
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.rows.len(), self.page_size)
    }

    pub fn pagination(&self) -> PaginationInfo {
        PaginationInfo::new(self.current_page, self.page_size, self.rows.len())
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Replace the record set and re-filter
    pub fn update_data(&mut self, records: Vec<Record>) {
        self.records = records;
        self.apply_filters();
    }

    pub fn original_data(&self) -> &[Record] {
        &self.records
    }

    /// Visible records in view order
    pub fn filtered_data(&self) -> Vec<&Record> {
        self.rows.iter().map(|&i| &self.records[i]).collect()
    }

    /// Indices into `original_data()` of the visible records, in view order
    pub fn filtered_indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn filtered_len(&self) -> usize {
        self.rows.len()
    }

    /// Records on the current page
    pub fn current_page_data(&self) -> Vec<&Record> {
        let range = page_range(self.current_page, self.page_size, self.rows.len());
        self.rows[range].iter().map(|&i| &self.records[i]).collect()
    }

    /// Distinct values of `field` over the visible rows.
    ///
    /// Grouped case-insensitively (trimmed), most frequent first, ties by
    /// key. Blank values are skipped. At most `max_values` entries.
    pub fn distinct_values(&self, field: &str, max_values: usize) -> Vec<DistinctValue> {
        let mut counts: FxHashMap<String, (String, usize)> = FxHashMap::default();
        for value in self.rows.iter().filter_map(|&i| self.records[i].present_path(field)) {
            let display = value.display_string();
            counts
                .entry(display.trim().to_lowercase())
                .and_modify(|(_, count)| *count += 1)
                .or_insert((display, 1));
        }

        let mut entries: Vec<DistinctValue> = counts
            .into_iter()
            .map(|(key, (display, count))| DistinctValue { key, display, count })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        entries.truncate(max_values);
        entries
    }

    /// Sum of the numeric values of `field` over the visible rows
    pub fn sum(&self, field: &str) -> f64 {
        self.rows
            .iter()
            .filter_map(|&i| self.records[i].get_path(field).and_then(Value::as_number))
            .sum()
    }

    // -------------------------------------------------------------------------
    // Hooks
    // -------------------------------------------------------------------------

    fn render(&mut self) {
        let range = page_range(self.current_page, self.page_size, self.rows.len());
        let page: Vec<&Record> = self.rows[range].iter().map(|&i| &self.records[i]).collect();
        self.hooks.display(&page);
    }

    fn notify_pagination(&mut self) {
        let info = PaginationInfo::new(self.current_page, self.page_size, self.rows.len());
        self.hooks.pagination(info);
    }
}

// =============================================================================
// Tests
// =============================================================================
