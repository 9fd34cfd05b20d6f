//! `eliza-web` – the browser front end.
//!
//! Boots a small HTTP server (default port `8000`) that:
//!
//! 1. **Serves** a single-page chat UI at `GET /`.
//! 2. **Answers** `POST /chat` with the responder's reply.  Each browser tab
//!    gets its own session, and therefore its own conversation memory, keyed
//!    by the `session_id` the server hands back.
//! 3. **Reports** liveness and the number of open sessions at `GET /health`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use eliza_engine::Engine;
//! use eliza_web::{ChatServer, ChatService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = ChatService::new(Engine::default()).with_default_user_name("Sweetheart");
//!     ChatServer::new(service)
//!         .run()
//!         .await
//!         .expect("chat server failed");
//! }
//! ```

pub mod server;
pub mod sessions;

pub use server::{ChatServer, ChatService, DEFAULT_PORT, DEFAULT_READ_TIMEOUT, parse_chat_request};
pub use sessions::{MAX_SESSIONS, SessionStore};
