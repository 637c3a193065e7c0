//! Ratatui chat interface.
//!
//! Single-threaded event loop: poll crossterm at a 100 ms cadence, drain
//! completed network calls from an `mpsc` channel, advance scheduled state
//! transitions, redraw. Each backend call runs on a short-lived named worker
//! thread so the interface stays responsive while a request is outstanding;
//! gating (one ingestion, one research call at a time) lives in
//! [`Session`], not here.

pub mod widgets;

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use miette::IntoDiagnostic;

use crate::api::{ApiClient, IngestReceipt, ResearchAnswer};
use crate::error::ApiError;
use crate::session::{IngestMode, IngestPayload, Session};

/// Which pane receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Ingest,
    Query,
}

/// Outcome of a background network call.
enum ApiEvent {
    Ingest(Result<IngestReceipt, ApiError>),
    Research(Result<ResearchAnswer, ApiError>),
}

/// TUI application state.
pub struct ChatTui {
    session: Session,
    client: Arc<ApiClient>,
    focus: Focus,
    /// Transcript lines hidden below the viewport; 0 follows the bottom.
    scroll: usize,
    /// Transient status-bar hint (e.g. the PDF filter refusing a path).
    notice: Option<String>,
    should_quit: bool,
    events_tx: mpsc::Sender<ApiEvent>,
    events_rx: mpsc::Receiver<ApiEvent>,
}

impl ChatTui {
    pub fn new(client: ApiClient) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            session: Session::new(),
            client: Arc::new(client),
            focus: Focus::Query,
            scroll: 0,
            notice: None,
            should_quit: false,
            events_tx,
            events_rx,
        }
    }

    /// Run the TUI event loop until the user quits.
    pub fn run(&mut self) -> miette::Result<()> {
        let mut terminal = ratatui::init();

        loop {
            self.drain_api_events();
            self.session.tick(Instant::now());

            let session = &self.session;
            let focus = self.focus;
            let scroll = &mut self.scroll;
            let server = self.client.server();
            let notice = self.notice.as_deref();
            terminal
                .draw(|frame| widgets::render(frame, session, focus, scroll, server, notice))
                .into_diagnostic()?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(100)).into_diagnostic()? {
                if let Event::Key(key) = event::read().into_diagnostic()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    self.handle_key(key.code, key.modifiers);
                }
            }
        }

        ratatui::restore();
        Ok(())
    }

    /// Apply completed network calls reported by worker threads.
    fn drain_api_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                ApiEvent::Ingest(result) => {
                    self.session.finish_ingest(result, Instant::now());
                }
                ApiEvent::Research(result) => {
                    self.session.finish_research(result);
                    self.scroll = 0;
                }
            }
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Ingest => Focus::Query,
                    Focus::Query => Focus::Ingest,
                };
                self.notice = None;
                return;
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_add(10);
                return;
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_sub(10);
                return;
            }
            KeyCode::End => {
                self.scroll = 0;
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Query => match code {
                KeyCode::Enter => self.submit_research(),
                KeyCode::Char(c) => self.session.push_query_char(c),
                KeyCode::Backspace => self.session.backspace_query(),
                _ => {}
            },
            Focus::Ingest => match code {
                KeyCode::Enter => self.submit_ingest(),
                KeyCode::Left => {
                    self.session.set_mode(self.session.mode().prev());
                    self.notice = None;
                }
                KeyCode::Right => {
                    self.session.set_mode(self.session.mode().next());
                    self.notice = None;
                }
                KeyCode::Char(c) => {
                    self.session.push_ingest_char(c);
                    self.notice = None;
                }
                KeyCode::Backspace => {
                    self.session.backspace_ingest();
                    self.notice = None;
                }
                _ => {}
            },
        }
    }

    fn submit_research(&mut self) {
        let Some(query) = self.session.begin_research() else {
            return;
        };
        self.scroll = 0;

        let client = Arc::clone(&self.client);
        let tx = self.events_tx.clone();
        let spawned = thread::Builder::new()
            .name("research-call".into())
            .spawn(move || {
                let _ = tx.send(ApiEvent::Research(client.research(&query)));
            });
        if spawned.is_err() {
            self.session.finish_research(Err(ApiError::Unexpected {
                message: "failed to spawn request thread".into(),
            }));
        }
    }

    fn submit_ingest(&mut self) {
        // The picker-filter analog: file mode only accepts .pdf paths. The
        // API client itself uploads whatever it is given.
        if self.session.mode() == IngestMode::File {
            let path = self.session.active_buffer();
            if !path.is_empty() && !path.to_ascii_lowercase().ends_with(".pdf") {
                self.notice = Some("only .pdf files can be uploaded".into());
                return;
            }
        }

        let Some(payload) = self.session.begin_ingest() else {
            return;
        };
        self.notice = None;

        let client = Arc::clone(&self.client);
        let tx = self.events_tx.clone();
        let spawned = thread::Builder::new()
            .name("ingest-call".into())
            .spawn(move || {
                let result = match payload {
                    IngestPayload::Url(source) => client.ingest(&source),
                    IngestPayload::Text(text) => client.ingest_text(&text),
                    IngestPayload::File(path) => client.ingest_file(&path),
                };
                let _ = tx.send(ApiEvent::Ingest(result));
            });
        if spawned.is_err() {
            self.session.finish_ingest(
                Err(ApiError::Unexpected {
                    message: "failed to spawn request thread".into(),
                }),
                Instant::now(),
            );
        }
    }
}

/// Launch the chat interface against a configured client.
pub fn launch(client: ApiClient) -> miette::Result<()> {
    ChatTui::new(client).run()
}
