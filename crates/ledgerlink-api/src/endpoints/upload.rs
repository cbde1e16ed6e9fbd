//! Entry submission
//!
//! The upload runs on its own task and reports through an [`UploadHandle`]:
//! non-decreasing progress fractions, then exactly one `Completed` or
//! `Failed`, then nothing.

use bytes::Bytes;
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use futures_util::stream::{self, StreamExt};
use ledgerlink_core::time::api_date;
use ledgerlink_core::Side;
use ledgerlink_utils::upload_file_name;
use reqwest::multipart::{Form, Part};
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{ApiError, ApiResult};
use crate::ApiClient;

const CHUNK_SIZE: usize = 16 * 1024;

/// Highest fraction reported before the server has answered
const MAX_IN_FLIGHT_PROGRESS: f64 = 0.99;

/// File attached to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Name as chosen by the user; renamed on upload
    pub file_name: String,
    pub content: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk, keeping its base name
    pub async fn read(path: &Path) -> ApiResult<Self> {
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, content))
    }
}

/// New entry as entered by the user
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySubmission {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub side: Side,
    pub category: String,
    pub description: String,
    pub files: Vec<UploadFile>,
}

impl EntrySubmission {
    pub fn validate(&self) -> ApiResult<()> {
        if self.category.trim().is_empty() {
            return Err(invalid("category is required"));
        }
        if self.description.trim().is_empty() {
            return Err(invalid("description is required"));
        }
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(invalid("amount must not be negative"));
        }
        Ok(())
    }

    pub fn total_file_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.content.len() as u64).sum()
    }

    /// Multipart form with every file renamed for `now`
    fn into_form<Tz: TimeZone>(self, now: &DateTime<Tz>, tracker: &Arc<ProgressTracker>) -> Form {
        let mut form = Form::new()
            .text("date", api_date(self.date))
            .text("amount", self.amount.to_string())
            .text("crdr", self.side.code())
            .text("category", self.category)
            .text("description", self.description);

        for file in self.files {
            let name = upload_file_name(&file.file_name, now);
            let length = file.content.len() as u64;
            let part = Part::stream_with_length(progress_body(file.content, tracker.clone()), length).file_name(name);
            form = form.part("file", part);
        }
        form
    }
}

fn invalid(message: &str) -> ApiError {
    ApiError::InvalidSubmission {
        message: message.to_string(),
    }
}

/// Event on an upload's progress stream
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// Fraction of file bytes handed to the transport, in `[0, 1]`
    Progress(f64),
    Completed,
    Failed(String),
}

impl UploadEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadEvent::Progress(_))
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    sent: u64,
    last: f64,
    finished: bool,
}

/// Turns byte counts into ordered progress events
struct ProgressTracker {
    total: u64,
    events: mpsc::UnboundedSender<UploadEvent>,
    state: Mutex<TrackerState>,
}

impl ProgressTracker {
    fn new(total: u64, events: mpsc::UnboundedSender<UploadEvent>) -> Self {
        Self {
            total,
            events,
            state: Mutex::new(TrackerState::default()),
        }
    }

    fn advance(&self, bytes: u64) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.finished || self.total == 0 {
            return;
        }
        state.sent += bytes;
        let fraction = (state.sent as f64 / self.total as f64).min(MAX_IN_FLIGHT_PROGRESS);
        if fraction > state.last {
            state.last = fraction;
            self.emit(&mut state, UploadEvent::Progress(fraction));
        }
    }

    fn finish(&self, outcome: Result<(), String>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.finished {
            return;
        }
        let terminal = match outcome {
            Ok(()) => {
                state.last = 1.0;
                self.emit(&mut state, UploadEvent::Progress(1.0));
                UploadEvent::Completed
            }
            Err(message) => UploadEvent::Failed(message),
        };
        self.emit(&mut state, terminal);
    }

    /// Send `event` unless the stream has ended; a terminal event ends it
    fn emit(&self, state: &mut TrackerState, event: UploadEvent) {
        if state.finished {
            return;
        }
        state.finished = event.is_terminal();
        let _ = self.events.send(event);
    }
}

fn progress_body(content: Bytes, tracker: Arc<ProgressTracker>) -> reqwest::Body {
    let chunks: Vec<Bytes> = (0..content.len())
        .step_by(CHUNK_SIZE)
        .map(|start| content.slice(start..(start + CHUNK_SIZE).min(content.len())))
        .collect();
    let stream = stream::iter(chunks).map(move |chunk| {
        tracker.advance(chunk.len() as u64);
        Ok::<Bytes, std::io::Error>(chunk)
    });
    reqwest::Body::wrap_stream(stream)
}

/// Running upload
pub struct UploadHandle {
    events: mpsc::UnboundedReceiver<UploadEvent>,
    task: JoinHandle<()>,
}

impl UploadHandle {
    /// Next event; `None` once the terminal event has been taken
    pub async fn next_event(&mut self) -> Option<UploadEvent> {
        self.events.recv().await
    }

    /// Drain the stream, passing progress to `on_progress`, and return the outcome
    pub async fn wait_with_progress<F: FnMut(f64)>(mut self, mut on_progress: F) -> ApiResult<()> {
        while let Some(event) = self.next_event().await {
            match event {
                UploadEvent::Progress(fraction) => on_progress(fraction),
                UploadEvent::Completed => return Ok(()),
                UploadEvent::Failed(message) => return Err(ApiError::UploadFailed { message }),
            }
        }
        let message = match (&mut self.task).await {
            Err(e) => format!("upload task failed: {}", e),
            Ok(()) => "upload ended without a result".to_string(),
        };
        Err(ApiError::UploadFailed { message })
    }

    pub async fn wait(self) -> ApiResult<()> {
        self.wait_with_progress(|_| {}).await
    }
}

impl ApiClient {
    /// Validate and start uploading `submission`
    pub fn submit_entry(&self, submission: EntrySubmission) -> ApiResult<UploadHandle> {
        submission.validate()?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let tracker = Arc::new(ProgressTracker::new(submission.total_file_bytes(), sender));
        let file_count = submission.files.len();
        let form = submission.into_form(&Local::now(), &tracker);
        let transport = self.transport.clone();
        let url = self.api.upload_endpoint.clone();

        log::info!(target: "ledgerlink::upload", "Submitting entry with {} file(s) to {}", file_count, url);

        let task = tokio::spawn(async move {
            let outcome = match transport.post_multipart(&url, form).await {
                Ok(response) if response.status().is_success() => Ok(()),
                Ok(response) => Err(format!(
                    "Failed to submit transaction. Status: {}",
                    response.status().as_u16()
                )),
                Err(e) => Err(e.to_string()),
            };
            match &outcome {
                Ok(()) => log::info!(target: "ledgerlink::upload", "Entry submitted"),
                Err(message) => log::error!(target: "ledgerlink::upload", "{}", message),
            }
            tracker.finish(outcome);
        });

        Ok(UploadHandle { events: receiver, task })
    }
}
