//! Drives one selected file through the validate-request lifecycle.

use std::{
    io,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use shared::{
    domain::{SelectedFile, SubmissionId},
    error::ServiceErrorBody,
    protocol::ValidationOutcome,
};
use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    endpoint::ServiceEndpoint,
    error::SubmitError,
    transport::{RawResponse, ValidationTransport},
};

const BODY_LOG_LIMIT: usize = 512;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestLifecycleState {
    #[default]
    Idle,
    InFlight,
    Succeeded(ValidationOutcome),
    Failed(String),
}

impl RequestLifecycleState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    pub fn outcome(&self) -> Option<&ValidationOutcome> {
        match self {
            Self::Succeeded(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerView {
    pub state: RequestLifecycleState,
    pub selected_file: Option<String>,
    pub can_submit: bool,
}

impl ControllerView {
    pub fn awaiting_selection(&self) -> bool {
        self.selected_file.is_none() && self.state == RequestLifecycleState::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDisposition {
    Started(SubmissionId),
    NoFileSelected,
    AlreadyInFlight,
    NoRuntime,
}

pub struct SubmissionController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    endpoint: ServiceEndpoint,
    transport: Arc<dyn ValidationTransport>,
    request_timeout: Duration,
    state: watch::Sender<RequestLifecycleState>,
    selection: Mutex<Option<Arc<SelectedFile>>>,
    bookkeeping: Mutex<Bookkeeping>,
}

#[derive(Default)]
struct Bookkeeping {
    current: Option<SubmissionId>,
    task: Option<JoinHandle<()>>,
    closed: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SubmissionController {
    pub fn new(
        endpoint: ServiceEndpoint,
        transport: Arc<dyn ValidationTransport>,
        request_timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(RequestLifecycleState::Idle);
        Self {
            inner: Arc::new(ControllerInner {
                endpoint,
                transport,
                request_timeout,
                state,
                selection: Mutex::new(None),
                bookkeeping: Mutex::new(Bookkeeping::default()),
            }),
        }
    }

    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.inner.endpoint
    }

    /// Replaces the current selection. A result already on screen stays until
    /// the next submission.
    pub fn select_file(&self, file: SelectedFile) {
        debug!(filename = %file.filename, bytes = file.len(), "file selected");
        *lock(&self.inner.selection) = Some(Arc::new(file));
    }

    pub fn clear_selection(&self) {
        *lock(&self.inner.selection) = None;
        self.inner.state.send_if_modified(|state| {
            if state.is_terminal() {
                *state = RequestLifecycleState::Idle;
                true
            } else {
                false
            }
        });
    }

    pub fn state(&self) -> RequestLifecycleState {
        self.inner.state.borrow().clone()
    }

    pub fn view(&self) -> ControllerView {
        let state = self.state();
        let selected_file = lock(&self.inner.selection)
            .as_ref()
            .map(|file| file.filename.clone());
        let can_submit = selected_file.is_some() && !state.is_in_flight();
        ControllerView {
            state,
            selected_file,
            can_submit,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestLifecycleState> {
        self.inner.state.subscribe()
    }

    /// Starts validating the selected file and returns immediately; the
    /// result arrives through [`state`](Self::state) and
    /// [`subscribe`](Self::subscribe). At most one request runs at a time.
    pub fn submit(&self) -> SubmitDisposition {
        let Some(file) = lock(&self.inner.selection).clone() else {
            debug!("submit ignored: no file selected");
            return SubmitDisposition::NoFileSelected;
        };

        let mut bookkeeping = lock(&self.inner.bookkeeping);
        if self.inner.state.borrow().is_in_flight() {
            warn!(
                current = ?bookkeeping.current,
                "submit rejected: a validation request is already in flight"
            );
            return SubmitDisposition::AlreadyInFlight;
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!("submit rejected: no tokio runtime to run the request on");
            return SubmitDisposition::NoRuntime;
        };

        let submission_id = SubmissionId::new();
        self.inner.state.send_replace(RequestLifecycleState::InFlight);

        let weak = Arc::downgrade(&self.inner);
        let transport = Arc::clone(&self.inner.transport);
        let url = self.inner.endpoint.validate_url().clone();
        let timeout = self.inner.request_timeout;
        let task = runtime.spawn(async move {
            let result =
                run_submission(transport.as_ref(), &url, &file, timeout, submission_id).await;
            finish(&weak, submission_id, result);
        });

        bookkeeping.current = Some(submission_id);
        bookkeeping.task = Some(task);
        SubmitDisposition::Started(submission_id)
    }

    pub async fn wait_for_completion(&self) -> RequestLifecycleState {
        let mut rx = self.subscribe();
        if let Ok(state) = rx.wait_for(|state| !state.is_in_flight()).await {
            return state.clone();
        }
        let state = rx.borrow().clone();
        state
    }
}

impl Drop for SubmissionController {
    fn drop(&mut self) {
        let mut bookkeeping = lock(&self.inner.bookkeeping);
        bookkeeping.closed = true;
        if let Some(task) = bookkeeping.task.take() {
            if !task.is_finished() {
                debug!(submission_id = ?bookkeeping.current, "controller dropped mid-flight; aborting request");
            }
            task.abort();
        }
    }
}

/// Applies a finished request to the controller, unless the controller is
/// gone or has moved on to another submission.
fn finish(
    weak: &Weak<ControllerInner>,
    submission_id: SubmissionId,
    result: Result<ValidationOutcome, SubmitError>,
) {
    let Some(inner) = weak.upgrade() else {
        debug!(%submission_id, "discarding response for dropped controller");
        return;
    };

    let mut bookkeeping = lock(&inner.bookkeeping);
    if bookkeeping.closed || bookkeeping.current != Some(submission_id) {
        debug!(%submission_id, "discarding stale validation response");
        return;
    }
    bookkeeping.current = None;
    bookkeeping.task = None;

    let next = match result {
        Ok(outcome) => {
            info!(
                %submission_id,
                passed = outcome.is_pass(),
                error_count = outcome.errors().len(),
                "validation completed"
            );
            RequestLifecycleState::Succeeded(outcome)
        }
        Err(err) => {
            warn!(%submission_id, error = %err, "validation request failed");
            RequestLifecycleState::Failed(err.to_string())
        }
    };
    inner.state.send_replace(next);
}

async fn run_submission(
    transport: &dyn ValidationTransport,
    url: &Url,
    file: &SelectedFile,
    timeout: Duration,
    submission_id: SubmissionId,
) -> Result<ValidationOutcome, SubmitError> {
    info!(
        %submission_id,
        %url,
        filename = %file.filename,
        bytes = file.len(),
        "submitting file for validation"
    );

    let response = tokio::time::timeout(timeout, transport.post_file(url, file))
        .await
        .map_err(|_| SubmitError::Timeout(timeout))??;

    interpret_response(submission_id, response)
}

/// Maps a raw response onto an outcome: non-2xx and undecodable bodies are
/// failures, anything else must match the `pass`/`fail` shape.
pub(crate) fn interpret_response(
    submission_id: SubmissionId,
    response: RawResponse,
) -> Result<ValidationOutcome, SubmitError> {
    if !response.is_success() {
        return Err(SubmitError::Protocol {
            status: response.status,
            detail: ServiceErrorBody::detail_from_slice(&response.body),
        });
    }

    serde_json::from_slice(&response.body).map_err(|err| {
        warn!(
            %submission_id,
            status = response.status,
            error = %err,
            body = %body_preview(&response.body),
            "could not decode validation response"
        );
        SubmitError::Decoding
    })
}

fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(BODY_LOG_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}

/// Reads a file from disk into a selection, keeping its base name.
pub async fn read_selected_file(path: &Path) -> io::Result<SelectedFile> {
    let bytes = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' does not name a file", path.display()),
            )
        })?;
    Ok(SelectedFile::new(filename, bytes))
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
