//! View state for the chat session.
//!
//! `Session` owns everything the interface displays: the ingestion form
//! (mode, per-mode buffers, transient status), the append-only transcript,
//! the query buffer, and the two independent busy flags. It is deliberately
//! terminal-free — the TUI event loop drives it and time is injected through
//! `Instant` parameters, so every state transition is checkable in plain
//! unit tests.
//!
//! Both network flows are transactional around a call:
//! `begin_*` validates and flips the busy flag, the caller performs the HTTP
//! request off-thread, and `finish_*` applies the outcome.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::api::{IngestReceipt, ResearchAnswer};
use crate::error::ApiError;
use crate::message::ChatMessage;

/// How long a successful ingest status stays visible before reverting.
pub const STATUS_REVERT_DELAY: Duration = Duration::from_secs(3);

/// Which ingestion input is active. Switching modes never clears the other
/// modes' buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    Url,
    File,
    Text,
}

impl IngestMode {
    pub const ALL: [IngestMode; 3] = [IngestMode::Url, IngestMode::File, IngestMode::Text];

    pub fn label(self) -> &'static str {
        match self {
            IngestMode::Url => "url",
            IngestMode::File => "file",
            IngestMode::Text => "text",
        }
    }

    /// Next mode in display order, wrapping.
    pub fn next(self) -> Self {
        match self {
            IngestMode::Url => IngestMode::File,
            IngestMode::File => IngestMode::Text,
            IngestMode::Text => IngestMode::Url,
        }
    }

    /// Previous mode in display order, wrapping.
    pub fn prev(self) -> Self {
        self.next().next()
    }
}

/// Transient ingestion indicator. `Success` reverts to `Idle` on its own;
/// `Error` holds until the next submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStatus {
    Idle,
    Success,
    Error,
}

/// Snapshot of the active buffer taken at submission time, telling the
/// caller which client operation to invoke.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestPayload {
    Url(String),
    Text(String),
    File(PathBuf),
}

/// All mutable interface state. See the module docs for the protocol.
pub struct Session {
    mode: IngestMode,
    url_buffer: String,
    file_buffer: String,
    text_buffer: String,
    status: IngestStatus,
    ingesting: bool,
    /// Mode captured at submission; its buffer is the one cleared on success
    /// even if the user switches tabs while the call is in flight.
    submitted_mode: Option<IngestMode>,
    /// Bumped on every submission; a scheduled revert from an older
    /// generation is stale and must not fire.
    generation: u64,
    revert_at: Option<(u64, Instant)>,
    /// Receipt message from the last successful ingestion, shown next to the
    /// success indicator.
    last_receipt: Option<String>,

    transcript: Vec<ChatMessage>,
    query_buffer: String,
    researching: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            mode: IngestMode::Url,
            url_buffer: String::new(),
            file_buffer: String::new(),
            text_buffer: String::new(),
            status: IngestStatus::Idle,
            ingesting: false,
            submitted_mode: None,
            generation: 0,
            revert_at: None,
            last_receipt: None,
            transcript: Vec::new(),
            query_buffer: String::new(),
            researching: false,
        }
    }

    // -- accessors --

    pub fn mode(&self) -> IngestMode {
        self.mode
    }

    pub fn status(&self) -> IngestStatus {
        self.status
    }

    pub fn is_ingesting(&self) -> bool {
        self.ingesting
    }

    pub fn is_researching(&self) -> bool {
        self.researching
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn query(&self) -> &str {
        &self.query_buffer
    }

    pub fn last_receipt(&self) -> Option<&str> {
        self.last_receipt.as_deref()
    }

    pub fn buffer(&self, mode: IngestMode) -> &str {
        match mode {
            IngestMode::Url => &self.url_buffer,
            IngestMode::File => &self.file_buffer,
            IngestMode::Text => &self.text_buffer,
        }
    }

    /// The buffer belonging to the active mode.
    pub fn active_buffer(&self) -> &str {
        self.buffer(self.mode)
    }

    // -- editing --

    pub fn set_mode(&mut self, mode: IngestMode) {
        self.mode = mode;
    }

    pub fn push_ingest_char(&mut self, c: char) {
        self.active_buffer_mut().push(c);
    }

    pub fn backspace_ingest(&mut self) {
        self.active_buffer_mut().pop();
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query_buffer.push(c);
    }

    pub fn backspace_query(&mut self) {
        self.query_buffer.pop();
    }

    fn active_buffer_mut(&mut self) -> &mut String {
        match self.mode {
            IngestMode::Url => &mut self.url_buffer,
            IngestMode::File => &mut self.file_buffer,
            IngestMode::Text => &mut self.text_buffer,
        }
    }

    // -- ingestion flow --

    /// Submission is possible iff the active buffer is non-empty and no
    /// ingestion is in flight.
    pub fn can_ingest(&self) -> bool {
        !self.ingesting && !self.active_buffer().is_empty()
    }

    /// Start an ingestion. Returns the payload the caller must send, or
    /// `None` when submission is currently gated.
    ///
    /// A new submission resets the status to idle before the call begins and
    /// supersedes any still-pending revert from an earlier success.
    pub fn begin_ingest(&mut self) -> Option<IngestPayload> {
        if !self.can_ingest() {
            return None;
        }
        let payload = match self.mode {
            IngestMode::Url => IngestPayload::Url(self.url_buffer.clone()),
            IngestMode::Text => IngestPayload::Text(self.text_buffer.clone()),
            IngestMode::File => IngestPayload::File(PathBuf::from(&self.file_buffer)),
        };
        self.status = IngestStatus::Idle;
        self.ingesting = true;
        self.submitted_mode = Some(self.mode);
        self.generation += 1;
        debug!(mode = self.mode.label(), generation = self.generation, "ingestion started");
        Some(payload)
    }

    /// Apply the outcome of the in-flight ingestion.
    ///
    /// Success clears only the submitted mode's buffer and schedules the
    /// status reversion; failure holds the error status until the next
    /// submission attempt.
    pub fn finish_ingest(&mut self, result: Result<IngestReceipt, ApiError>, now: Instant) {
        self.ingesting = false;
        let submitted = self.submitted_mode.take();
        match result {
            Ok(receipt) => {
                self.status = IngestStatus::Success;
                self.last_receipt = Some(receipt.message);
                if let Some(mode) = submitted {
                    match mode {
                        IngestMode::Url => self.url_buffer.clear(),
                        IngestMode::File => self.file_buffer.clear(),
                        IngestMode::Text => self.text_buffer.clear(),
                    }
                }
                self.revert_at = Some((self.generation, now + STATUS_REVERT_DELAY));
            }
            Err(err) => {
                debug!(error = %err, "ingestion failed");
                self.status = IngestStatus::Error;
                self.last_receipt = None;
            }
        }
    }

    /// Advance scheduled transitions. Called once per event-loop iteration.
    ///
    /// A revert scheduled by a superseded submission is dropped without
    /// firing; the current generation's revert fires once its deadline
    /// passes.
    pub fn tick(&mut self, now: Instant) {
        if let Some((generation, at)) = self.revert_at {
            if generation != self.generation {
                self.revert_at = None;
            } else if now >= at {
                self.status = IngestStatus::Idle;
                self.revert_at = None;
            }
        }
    }

    // -- research flow --

    /// A query can be submitted iff it is non-empty and no research call is
    /// in flight.
    pub fn can_research(&self) -> bool {
        !self.researching && !self.query_buffer.is_empty()
    }

    /// Start a research round-trip: append the user message optimistically,
    /// clear the query input, set the busy flag. Returns the query to send,
    /// or `None` when gated.
    pub fn begin_research(&mut self) -> Option<String> {
        if !self.can_research() {
            return None;
        }
        let query = std::mem::take(&mut self.query_buffer);
        self.transcript.push(ChatMessage::user(query.clone()));
        self.researching = true;
        debug!(query = %query, "research started");
        Some(query)
    }

    /// Apply the outcome of the in-flight research call.
    ///
    /// Failures are absorbed into the transcript as the fixed fallback
    /// message — the error's own text is discarded and nothing is retried.
    pub fn finish_research(&mut self, result: Result<ResearchAnswer, ApiError>) {
        self.researching = false;
        match result {
            Ok(answer) => {
                self.transcript.push(ChatMessage::answer(
                    answer.answer,
                    answer.confidence_score,
                    answer.source_chunk_ids,
                ));
            }
            Err(err) => {
                debug!(error = %err, "research failed");
                self.transcript.push(ChatMessage::fallback());
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{RESEARCH_FALLBACK, Role};

    fn receipt() -> IngestReceipt {
        IngestReceipt {
            status: "success".into(),
            message: "Successfully ingested https://example.com".into(),
            chunks_count: 4,
        }
    }

    fn answer() -> ResearchAnswer {
        ResearchAnswer {
            answer: "Paris.".into(),
            confidence_score: 0.92,
            source_chunk_ids: vec!["c1".into(), "c2".into()],
        }
    }

    fn type_into(session: &mut Session, text: &str) {
        for c in text.chars() {
            session.push_ingest_char(c);
        }
    }

    #[test]
    fn submit_disabled_iff_buffer_empty_or_in_flight() {
        let mut session = Session::new();
        for mode in IngestMode::ALL {
            session.set_mode(mode);
            assert!(!session.can_ingest(), "{} empty", mode.label());
        }

        session.set_mode(IngestMode::Url);
        type_into(&mut session, "https://example.com");
        assert!(session.can_ingest());

        session.begin_ingest().unwrap();
        assert!(!session.can_ingest(), "gated while in flight");

        // Even a different, filled mode stays gated while in flight.
        session.set_mode(IngestMode::Text);
        type_into(&mut session, "some text");
        assert!(!session.can_ingest());
    }

    #[test]
    fn file_mode_with_no_file_selected_stays_disabled() {
        let mut session = Session::new();
        session.set_mode(IngestMode::File);
        assert!(!session.can_ingest());
        assert!(session.begin_ingest().is_none());
    }

    #[test]
    fn switching_modes_preserves_other_buffers() {
        let mut session = Session::new();
        type_into(&mut session, "https://example.com");
        session.set_mode(IngestMode::Text);
        type_into(&mut session, "pasted notes");
        session.set_mode(IngestMode::Url);
        assert_eq!(session.active_buffer(), "https://example.com");
        assert_eq!(session.buffer(IngestMode::Text), "pasted notes");
    }

    #[test]
    fn success_clears_only_the_submitted_buffer() {
        let mut session = Session::new();
        type_into(&mut session, "https://example.com");
        session.set_mode(IngestMode::Text);
        type_into(&mut session, "pasted notes");
        session.set_mode(IngestMode::Url);

        let payload = session.begin_ingest().unwrap();
        assert_eq!(payload, IngestPayload::Url("https://example.com".into()));

        let now = Instant::now();
        session.finish_ingest(Ok(receipt()), now);
        assert_eq!(session.status(), IngestStatus::Success);
        assert!(session.buffer(IngestMode::Url).is_empty());
        assert_eq!(session.buffer(IngestMode::Text), "pasted notes");
    }

    #[test]
    fn success_clears_the_submitted_mode_even_after_a_tab_switch() {
        let mut session = Session::new();
        type_into(&mut session, "https://example.com");
        session.begin_ingest().unwrap();

        // User flips to text mode while the call is in flight.
        session.set_mode(IngestMode::Text);
        type_into(&mut session, "draft");

        session.finish_ingest(Ok(receipt()), Instant::now());
        assert!(session.buffer(IngestMode::Url).is_empty());
        assert_eq!(session.buffer(IngestMode::Text), "draft");
    }

    #[test]
    fn status_reverts_after_exactly_the_configured_delay() {
        let mut session = Session::new();
        type_into(&mut session, "https://example.com");
        session.begin_ingest().unwrap();

        let t0 = Instant::now();
        session.finish_ingest(Ok(receipt()), t0);

        session.tick(t0 + STATUS_REVERT_DELAY - Duration::from_millis(1));
        assert_eq!(session.status(), IngestStatus::Success);

        session.tick(t0 + STATUS_REVERT_DELAY);
        assert_eq!(session.status(), IngestStatus::Idle);
    }

    #[test]
    fn error_status_holds_until_the_next_submission() {
        let mut session = Session::new();
        type_into(&mut session, "https://bad.example");
        session.begin_ingest().unwrap();
        session.finish_ingest(
            Err(ApiError::Backend {
                message: "Could not load data from source.".into(),
            }),
            Instant::now(),
        );
        assert_eq!(session.status(), IngestStatus::Error);

        // No amount of elapsed time clears an error.
        session.tick(Instant::now() + Duration::from_secs(3600));
        assert_eq!(session.status(), IngestStatus::Error);

        // The next submission attempt does.
        type_into(&mut session, "https://good.example");
        session.begin_ingest().unwrap();
        assert_eq!(session.status(), IngestStatus::Idle);
        assert!(session.is_ingesting());
    }

    #[test]
    fn stale_revert_never_downgrades_a_newer_status() {
        let mut session = Session::new();
        type_into(&mut session, "https://one.example");
        session.begin_ingest().unwrap();

        let t0 = Instant::now();
        session.finish_ingest(Ok(receipt()), t0);

        // A second ingestion starts before the revert fires, then fails.
        type_into(&mut session, "https://two.example");
        session.begin_ingest().unwrap();
        session.finish_ingest(
            Err(ApiError::Connectivity),
            t0 + Duration::from_secs(1),
        );

        // The first success's revert deadline passes; the error must hold.
        session.tick(t0 + STATUS_REVERT_DELAY);
        assert_eq!(session.status(), IngestStatus::Error);
    }

    #[test]
    fn research_round_trip_appends_exactly_two_messages() {
        let mut session = Session::new();
        for c in "What is the capital of France?".chars() {
            session.push_query_char(c);
        }

        let query = session.begin_research().unwrap();
        assert_eq!(query, "What is the capital of France?");
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, Role::User);
        assert_eq!(session.transcript()[0].content, query);
        assert!(session.query().is_empty());

        session.finish_research(Ok(answer()));
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.transcript()[1].role, Role::Assistant);
        assert_eq!(session.transcript()[1].content, "Paris.");
    }

    #[test]
    fn research_failure_appends_the_fixed_fallback_not_the_detail() {
        let mut session = Session::new();
        session.push_query_char('q');
        session.begin_research().unwrap();
        session.finish_research(Err(ApiError::Backend {
            message: "rate limited".into(),
        }));

        assert_eq!(session.transcript().len(), 2);
        let reply = &session.transcript()[1];
        assert_eq!(reply.content, RESEARCH_FALLBACK);
        assert!(reply.confidence.is_none());
    }

    #[test]
    fn second_query_rejected_while_one_is_pending() {
        let mut session = Session::new();
        session.push_query_char('a');
        session.begin_research().unwrap();

        for c in "What is the capital of France?".chars() {
            session.push_query_char(c);
        }
        assert!(!session.can_research());
        assert!(session.begin_research().is_none());
        assert_eq!(session.transcript().len(), 1);

        session.finish_research(Ok(answer()));
        assert!(session.can_research());
    }

    #[test]
    fn empty_query_is_a_no_op() {
        let mut session = Session::new();
        assert!(session.begin_research().is_none());
        assert!(session.transcript().is_empty());
        assert!(!session.is_researching());
    }

    #[test]
    fn ingestion_and_research_gate_independently() {
        let mut session = Session::new();
        type_into(&mut session, "https://example.com");
        session.begin_ingest().unwrap();

        session.push_query_char('q');
        assert!(session.can_research(), "research unaffected by ingestion");
        session.begin_research().unwrap();
        assert!(session.is_ingesting());
        assert!(session.is_researching());
    }
}
