//! # lectern
//!
//! Terminal client for a retrieval-augmented research assistant. Ingest
//! source material (a URL, pasted text, or a PDF) into the backend's
//! knowledge base, then ask questions answered against it — all the hard
//! parts (parsing, chunking, retrieval, generation) live in the backend;
//! this crate is presentation and HTTP glue.
//!
//! ## Architecture
//!
//! - **API client** (`api`, `error`, `config`): typed wrappers over the
//!   backend's REST endpoints with single-message error normalization
//! - **View state** (`session`, `message`): the ingestion/research state
//!   machines and the append-only chat transcript
//! - **Interface** (`tui`): ratatui chat loop with background request threads
//!
//! ## Library usage
//!
//! ```no_run
//! use lectern::api::ApiClient;
//! use lectern::config::ClientConfig;
//!
//! let client = ApiClient::new(ClientConfig::default()).unwrap();
//! client.ingest("https://example.com/paper").unwrap();
//! let answer = client.research("What does the paper claim?").unwrap();
//! println!("{}", answer.answer);
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod message;
pub mod session;
pub mod tui;
