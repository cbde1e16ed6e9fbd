//! Paged entry listing
//!
//! Every fetch is issued against a [`FetchTicket`] carrying the generation and
//! the request snapshot it was built from. Resetting or re-filtering bumps the
//! generation, so a response for an older ticket is dropped on arrival.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::models::{Entry, FilterRequest, ListingFilters};
use crate::normalize::EntryNormalizer;
use crate::time::{api_date, parse_flexible_date, Clock, SystemClock};

pub const LOAD_ERROR_MESSAGE: &str = "Error loading entries. Please try again.";
pub const EMPTY_FILTERED_MESSAGE: &str = "No entries found matching your filters.";
pub const EMPTY_LEDGER_MESSAGE: &str = "No entries found. Try adding some transactions first.";

/// Backend page fetch
#[async_trait]
pub trait EntrySource: Send + Sync {
    /// Raw response payload for one filter request
    async fn fetch_page(&self, request: &FilterRequest) -> CoreResult<Value>;
}

/// Filter values as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterInput {
    pub query: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl FilterInput {
    /// Convert to wire filters: query trimmed, dates as `DD-mon-YYYY`
    ///
    /// Blank values and dates that do not parse are left out.
    pub fn to_filters(&self) -> ListingFilters {
        ListingFilters {
            query_string: self
                .query
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            start_date: wire_date(self.start_date.as_deref()),
            end_date: wire_date(self.end_date.as_deref()),
        }
    }
}

fn wire_date(input: Option<&str>) -> Option<String> {
    let input = input.map(str::trim).filter(|s| !s.is_empty())?;
    match parse_flexible_date(input) {
        Some(date) => Some(api_date(date)),
        None => {
            log::warn!(target: "ledgerlink::listing", "Ignoring unparseable filter date {:?}", input);
            None
        }
    }
}

/// Paging state of the current listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingState {
    pub filters: ListingFilters,
    /// Current page, at least 1
    pub page: usize,
    pub total_loaded: usize,
    pub exhausted: bool,
    pub loading: bool,
}

impl Default for ListingState {
    fn default() -> Self {
        Self {
            filters: ListingFilters::default(),
            page: 1,
            total_loaded: 0,
            exhausted: false,
            loading: false,
        }
    }
}

/// What the listing should show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ListingStatus {
    Idle,
    Loading,
    Loaded,
    Empty(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    Reset,
    More,
}

/// Outstanding fetch, tagged with the state it was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    kind: FetchKind,
    pub request: FilterRequest,
}

impl FetchTicket {
    pub fn page(&self) -> usize {
        self.request.page_number
    }
}

/// Listing state machine
pub struct ListingController {
    page_size: usize,
    state: ListingState,
    entries: Vec<Entry>,
    status: ListingStatus,
    generation: u64,
    /// Highest page accepted in this generation
    loaded_pages: usize,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn ErrorLogger>,
}

impl ListingController {
    pub fn new(page_size: usize) -> Self {
        Self::with_clock(page_size, Arc::new(SystemClock))
    }

    pub fn with_clock(page_size: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            page_size: page_size.max(1),
            state: ListingState::default(),
            entries: Vec::new(),
            status: ListingStatus::Idle,
            generation: 0,
            loaded_pages: 0,
            clock,
            logger: Arc::new(DefaultErrorLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn status(&self) -> &ListingStatus {
        &self.status
    }

    /// Whether `load_more` would issue a fetch
    pub fn has_more(&self) -> bool {
        !self.state.exhausted && !self.state.loading && self.loaded_pages > 0
    }

    /// Clear filters and start over from page 1
    pub fn begin_reset_and_load(&mut self) -> FetchTicket {
        self.begin_reset(ListingFilters::default())
    }

    /// Replace filters and start over from page 1
    pub fn begin_apply_filters(&mut self, input: &FilterInput) -> FetchTicket {
        self.begin_reset(input.to_filters())
    }

    fn begin_reset(&mut self, filters: ListingFilters) -> FetchTicket {
        self.generation += 1;
        self.loaded_pages = 0;
        self.entries.clear();
        self.state = ListingState {
            filters,
            page: 1,
            total_loaded: 0,
            exhausted: false,
            loading: true,
        };
        self.status = ListingStatus::Loading;
        self.ticket(FetchKind::Reset, 1)
    }

    /// Next page; `None` when exhausted or a fetch is already in flight
    pub fn begin_load_more(&mut self) -> Option<FetchTicket> {
        if !self.has_more() {
            log::debug!(
                target: "ledgerlink::listing",
                "load_more ignored (exhausted: {}, loading: {})",
                self.state.exhausted,
                self.state.loading
            );
            return None;
        }
        self.state.loading = true;
        self.status = ListingStatus::Loading;
        Some(self.ticket(FetchKind::More, self.loaded_pages + 1))
    }

    fn ticket(&self, kind: FetchKind, page_number: usize) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            kind,
            request: FilterRequest {
                limit: self.page_size,
                page_number,
                filters: self.state.filters.clone(),
            },
        }
    }

    /// Apply a fetch result; returns `false` when the ticket is stale
    pub fn complete(&mut self, ticket: FetchTicket, result: CoreResult<Value>) -> bool {
        if ticket.generation != self.generation {
            log::debug!(
                target: "ledgerlink::listing",
                "Discarding stale response for page {} (generation {} != {})",
                ticket.page(),
                ticket.generation,
                self.generation
            );
            return false;
        }
        self.state.loading = false;

        match result {
            Ok(raw) => self.accept_page(&ticket, &raw),
            Err(e) => self.reject_page(&ticket, &e),
        }
        true
    }

    fn accept_page(&mut self, ticket: &FetchTicket, raw: &Value) {
        let normalizer = EntryNormalizer::new(self.clock.as_ref());
        let page = normalizer.normalize_page(raw);
        let count = page.entries.len();

        if ticket.kind == FetchKind::Reset {
            self.entries.clear();
        }
        self.entries.extend(page.entries);
        self.loaded_pages = ticket.page();
        self.state.page = ticket.page();
        self.state.total_loaded += count;
        self.state.exhausted = page.record_count < self.page_size;

        log::info!(
            target: "ledgerlink::listing",
            "Loaded page {} ({} entries, {} skipped, exhausted: {})",
            ticket.page(),
            count,
            page.skipped,
            self.state.exhausted
        );

        self.status = if self.state.total_loaded == 0 {
            ListingStatus::Empty(self.empty_message().to_string())
        } else {
            ListingStatus::Loaded
        };
    }

    fn reject_page(&mut self, ticket: &FetchTicket, error: &CoreError) {
        let context = ErrorContext::new("listing.fetch_page")
            .with("page", serde_json::json!(ticket.page()))
            .with("generation", serde_json::json!(ticket.generation));
        self.logger.report(error, &context);
        self.status = ListingStatus::Error(LOAD_ERROR_MESSAGE.to_string());
    }

    fn empty_message(&self) -> &'static str {
        if self.state.filters.is_active() {
            EMPTY_FILTERED_MESSAGE
        } else {
            EMPTY_LEDGER_MESSAGE
        }
    }

    /// Clear filters and load page 1 from `source`
    pub async fn reset_and_load(&mut self, source: &dyn EntrySource) {
        let ticket = self.begin_reset_and_load();
        self.run(ticket, source).await;
    }

    /// Apply filters and load page 1 from `source`
    pub async fn apply_filters(&mut self, input: &FilterInput, source: &dyn EntrySource) {
        let ticket = self.begin_apply_filters(input);
        self.run(ticket, source).await;
    }

    /// Load the next page; returns `false` when nothing was fetched
    pub async fn load_more(&mut self, source: &dyn EntrySource) -> bool {
        match self.begin_load_more() {
            Some(ticket) => {
                self.run(ticket, source).await;
                true
            }
            None => false,
        }
    }

    async fn run(&mut self, ticket: FetchTicket, source: &dyn EntrySource) {
        let result = source.fetch_page(&ticket.request).await;
        self.complete(ticket, result);
    }
}
