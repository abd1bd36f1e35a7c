//! Roster view controller: cursor-stack pagination over the student
//! collection, the page-local expiry filter, and the save/delete flows that
//! send the view back to page one.
//!
//! The controller owns all view state. Presentation code reads it through
//! [`RosterController::snapshot`] or registers an observer that receives a
//! fresh snapshot after every change.

use crate::clock::Clock;
use crate::expiry::ExpiryWindow;
use crate::migrate::{self, MigrationReport};
use crate::model::{Student, StudentFields};
use crate::store::{CountFilter, CountService, Cursor, DocumentStore, PageQuery, StoreError};
use crate::validate::{self, StudentDraft, ValidationError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const DEFAULT_PAGE_SIZE: usize = 10;

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum RosterError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no delete is awaiting confirmation")]
    NoPendingDelete,
}

impl RosterError {
    /// Text safe to show staff. Store failures collapse to one message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(v) => v.to_string(),
            Self::Store(_) => GENERIC_FAILURE.to_string(),
            Self::NoPendingDelete => self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveMode {
    Add,
    Edit(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDelete {
    pub student_id: String,
    pub student_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSnapshot {
    /// The current page after the expiry filter.
    pub students: Vec<Student>,
    pub page_row_count: usize,
    pub page_number: usize,
    pub page_size: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub total_count: Option<u64>,
    pub loading: bool,
    pub expiry_filter: ExpiryWindow,
    pub pending_delete: Option<PendingDelete>,
}

type Observer = Box<dyn FnMut(&RosterSnapshot)>;

pub struct RosterController<S> {
    store: S,
    clock: Box<dyn Clock>,
    page_size: usize,

    page: Vec<Student>,
    cursor_stack: Vec<Cursor>,
    last_cursor: Option<Cursor>,
    page_number: usize,
    has_next_page: bool,
    total_count: Option<u64>,
    loading: bool,
    expiry_filter: ExpiryWindow,
    pending_delete: Option<PendingDelete>,

    observers: Vec<Observer>,
}

impl<S: DocumentStore + CountService> RosterController<S> {
    pub fn new(store: S, clock: Box<dyn Clock>, page_size: usize) -> Self {
        Self {
            store,
            clock,
            page_size: page_size.max(1),
            page: Vec::new(),
            cursor_stack: Vec::new(),
            last_cursor: None,
            page_number: 1,
            has_next_page: false,
            total_count: None,
            loading: false,
            expiry_filter: ExpiryWindow::All,
            pending_delete: None,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&RosterSnapshot) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn cursor_depth(&self) -> usize {
        self.cursor_stack.len()
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub fn expiry_filter(&self) -> ExpiryWindow {
        self.expiry_filter
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    /// Every row of the fetched page, ignoring the expiry filter.
    pub fn page(&self) -> &[Student] {
        &self.page
    }

    /// Rows of the fetched page that pass the expiry filter. Only the loaded
    /// page is considered; matches on other pages are not visible here.
    pub fn visible_students(&self) -> Vec<&Student> {
        let now = self.clock.now();
        self.page
            .iter()
            .filter(|s| self.expiry_filter.includes(s.membership_end, now))
            .collect()
    }

    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            students: self.visible_students().into_iter().cloned().collect(),
            page_row_count: self.page.len(),
            page_number: self.page_number,
            page_size: self.page_size,
            has_next_page: self.has_next_page,
            has_previous_page: self.page_number > 1,
            total_count: self.total_count,
            loading: self.loading,
            expiry_filter: self.expiry_filter,
            pending_delete: self.pending_delete.clone(),
        }
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in self.observers.iter_mut() {
            observer(&snapshot);
        }
    }

    /// Initial load: creation-time backfill, then page one and the total.
    pub fn open(&mut self) -> MigrationReport {
        let now = self.clock.now().to_utc();
        let report = match migrate::backfill_created_at(&self.store, now) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "created_at backfill scan failed; continuing");
                MigrationReport::default()
            }
        };
        let _ = self.reset_to_first_page();
        let _ = self.refresh_count();
        report
    }

    /// Loads the page that starts after `cursor`, or page one. Returns
    /// `Ok(false)` when another fetch is already in flight.
    pub fn fetch_page(&mut self, cursor: Option<Cursor>) -> Result<bool, StoreError> {
        if self.loading {
            debug!("page fetch suppressed; another fetch is in flight");
            return Ok(false);
        }
        self.loading = true;
        self.notify();

        // One extra row tells us whether a further page exists.
        let query = PageQuery::newest_first(cursor, self.page_size + 1);
        let result = self.store.query_page(&query);
        self.loading = false;

        match result {
            Ok(mut rows) => {
                let overflow = rows.len() > self.page_size;
                rows.truncate(self.page_size);
                self.last_cursor = rows.last().and_then(Cursor::after);
                if overflow && self.last_cursor.is_none() {
                    warn!(
                        page = self.page_number,
                        "last row has no readable created_at; further pages unreachable until backfill"
                    );
                }
                self.has_next_page = overflow && self.last_cursor.is_some();
                self.page = rows;
                self.notify();
                Ok(true)
            }
            Err(e) => {
                error!(error = %e, page = self.page_number, "failed to fetch roster page");
                self.notify();
                Err(e)
            }
        }
    }

    pub fn next_page(&mut self) -> Result<bool, StoreError> {
        if !self.has_next_page || self.loading {
            return Ok(false);
        }
        let Some(cursor) = self.last_cursor.clone() else {
            return Ok(false);
        };

        self.cursor_stack.push(cursor.clone());
        self.page_number += 1;
        match self.fetch_page(Some(cursor)) {
            Ok(true) => Ok(true),
            other => {
                self.cursor_stack.pop();
                self.page_number -= 1;
                self.notify();
                other
            }
        }
    }

    pub fn previous_page(&mut self) -> Result<bool, StoreError> {
        if self.page_number <= 1 || self.loading {
            return Ok(false);
        }

        let popped = self.cursor_stack.pop();
        self.page_number -= 1;
        let target = self.cursor_stack.last().cloned();
        match self.fetch_page(target) {
            Ok(true) => Ok(true),
            other => {
                self.cursor_stack.extend(popped);
                self.page_number += 1;
                self.notify();
                other
            }
        }
    }

    pub fn reset_to_first_page(&mut self) -> Result<bool, StoreError> {
        let saved_stack = std::mem::take(&mut self.cursor_stack);
        let saved_page = self.page_number;
        self.page_number = 1;
        match self.fetch_page(None) {
            Ok(true) => Ok(true),
            other => {
                self.cursor_stack = saved_stack;
                self.page_number = saved_page;
                self.notify();
                other
            }
        }
    }

    pub fn set_expiry_filter(&mut self, window: ExpiryWindow) {
        if self.expiry_filter == window {
            return;
        }
        self.expiry_filter = window;
        self.notify();
    }

    /// Re-reads the collection total. On failure the cached total stays.
    pub fn refresh_count(&mut self) -> Result<u64, StoreError> {
        match self.store.count(&CountFilter::all()) {
            Ok(n) => {
                self.total_count = Some(n);
                self.notify();
                Ok(n)
            }
            Err(e) => {
                error!(error = %e, "failed to count students");
                Err(e)
            }
        }
    }

    /// Validates and writes the draft, restarting the membership window at
    /// the save time. Returns the student id.
    pub fn save_student(&mut self, mode: SaveMode, draft: &StudentDraft) -> Result<String, RosterError> {
        let valid = validate::validate_draft(draft)?;

        let now = self.clock.now();
        let fields = StudentFields {
            name: valid.name,
            age: valid.age,
            email: valid.email,
            coaching: valid.coaching,
            status: valid.status,
            plan: valid.plan,
            membership_start: now.to_utc(),
            membership_end: valid.plan.membership_end(&now).to_utc(),
        };

        let student_id = match mode {
            SaveMode::Add => self.store.insert(&fields, now.to_utc()).map_err(|e| {
                error!(error = %e, "failed to add student");
                e
            })?,
            SaveMode::Edit(id) => {
                self.store.update(&id, &fields, now.to_utc()).map_err(|e| {
                    error!(student_id = %id, error = %e, "failed to update student");
                    e
                })?;
                id
            }
        };
        info!(student_id = %student_id, plan = fields.plan.label(), "student saved");

        self.after_mutation();
        Ok(student_id)
    }

    /// First step of a delete: remember what the confirmation is about.
    pub fn request_delete(&mut self, student_id: &str) -> PendingDelete {
        let student_name = self
            .page
            .iter()
            .find(|s| s.id == student_id)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        let pending = PendingDelete {
            student_id: student_id.to_string(),
            student_name,
        };
        self.pending_delete = Some(pending.clone());
        self.notify();
        pending
    }

    pub fn cancel_delete(&mut self) {
        if self.pending_delete.take().is_some() {
            self.notify();
        }
    }

    /// Second step of a delete. The confirmation stays open if the store
    /// rejects the delete.
    pub fn confirm_delete(&mut self) -> Result<(), RosterError> {
        let Some(pending) = self.pending_delete.clone() else {
            return Err(RosterError::NoPendingDelete);
        };
        if let Err(e) = self.store.delete(&pending.student_id) {
            error!(student_id = %pending.student_id, error = %e, "failed to delete student");
            return Err(e.into());
        }
        info!(student_id = %pending.student_id, "student deleted");
        self.pending_delete = None;
        self.after_mutation();
        Ok(())
    }

    fn after_mutation(&mut self) {
        // Both log their own failures; the mutation itself already succeeded.
        let _ = self.reset_to_first_page();
        let _ = self.refresh_count();
    }
}
