//! Render hooks for table view changes.
//!
//! The host UI registers callbacks; the engine calls them after every state
//! change that affects what is on screen. The engine never renders itself.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::page::PaginationInfo;
use crate::value::Record;

/// Receives the records of the current page.
pub type DisplayCallback = Box<dyn FnMut(&[&Record]) + Send>;

/// Receives page counters after filtering or paging.
pub type PaginationCallback = Box<dyn FnMut(PaginationInfo) + Send>;

/// Receives the full filtered set after the filter pipeline runs.
pub type FilterChangeCallback = Box<dyn FnMut(&[&Record]) + Send>;

/// Optional callbacks fired by the engine.
#[derive(Default)]
pub struct ViewHooks {
    pub on_display_update: Option<DisplayCallback>,
    pub on_pagination_update: Option<PaginationCallback>,
    pub on_filter_change: Option<FilterChangeCallback>,
}

impl ViewHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_display_update<F>(mut self, f: F) -> Self
    where
        F: FnMut(&[&Record]) + Send + 'static,
    {
        self.on_display_update = Some(Box::new(f));
        self
    }

    pub fn on_pagination_update<F>(mut self, f: F) -> Self
    where
        F: FnMut(PaginationInfo) + Send + 'static,
    {
        self.on_pagination_update = Some(Box::new(f));
        self
    }

    pub fn on_filter_change<F>(mut self, f: F) -> Self
    where
        F: FnMut(&[&Record]) + Send + 'static,
    {
        self.on_filter_change = Some(Box::new(f));
        self
    }

    pub(crate) fn display(&mut self, page: &[&Record]) {
        if let Some(cb) = self.on_display_update.as_mut() {
            cb(page);
        }
    }

    pub(crate) fn pagination(&mut self, info: PaginationInfo) {
        if let Some(cb) = self.on_pagination_update.as_mut() {
            cb(info);
        }
    }

    pub(crate) fn filter_change(&mut self, filtered: &[&Record]) {
        if let Some(cb) = self.on_filter_change.as_mut() {
            cb(filtered);
        }
    }
}

impl std::fmt::Debug for ViewHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewHooks")
            .field("on_display_update", &self.on_display_update.is_some())
            .field("on_pagination_update", &self.on_pagination_update.is_some())
            .field("on_filter_change", &self.on_filter_change.is_some())
            .finish()
    }
}

/// Hook invocations, recorded in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// Records shown on the current page
    Display(Vec<Record>),
    Pagination(PaginationInfo),
    /// Size of the filtered set
    FilterChange(usize),
}

/// Simple event collector for testing and headless hosts.
///
/// Clones share one buffer, so a collector can be wired into hooks and
/// still be read afterwards.
#[derive(Debug, Clone, Default)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<ViewEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hooks that record every invocation into this collector
    pub fn hooks(&self) -> ViewHooks {
        let display = self.clone();
        let pagination = self.clone();
        let filter = self.clone();
        ViewHooks::new()
            .on_display_update(move |page| {
                display.push(ViewEvent::Display(page.iter().map(|r| (*r).clone()).collect()))
            })
            .on_pagination_update(move |info| pagination.push(ViewEvent::Pagination(info)))
            .on_filter_change(move |filtered| filter.push(ViewEvent::FilterChange(filtered.len())))
    }

    // A hook that panicked mid-push leaves the buffer usable; keep recording.
    fn lock(&self) -> MutexGuard<'_, Vec<ViewEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, event: ViewEvent) {
        self.lock().push(event);
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Filter to only Display events.
    pub fn displays(&self) -> Vec<Vec<Record>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Display(page) => Some(page),
                _ => None,
            })
            .collect()
    }

    /// Filter to only Pagination events.
    pub fn paginations(&self) -> Vec<PaginationInfo> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Pagination(info) => Some(info),
                _ => None,
            })
            .collect()
    }

    /// Filter to only FilterChange events.
    pub fn filter_changes(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::FilterChange(n) => Some(n),
                _ => None,
            })
            .collect()
    }
}
