//! [`ChatServer`] – minimal HTTP front end for the responder.
//!
//! Listens on `0.0.0.0:8000` (configurable via [`ChatServer::with_port`]).
//!
//! | Route          | Response                                          |
//! |----------------|---------------------------------------------------|
//! | `GET /`        | the embedded chat page                            |
//! | `POST /chat`   | `{reply, user_name, session_id, farewell}` JSON   |
//! | `GET /health`  | `{"status":"ok","sessions":N}`                    |
//!
//! Anything else is answered with 404 (unknown path) or 405 (known path,
//! wrong method).  Requests that never reach the router get 408 (not complete
//! within the read timeout), 411 (chunked body) or 413 (over 64 KiB).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use eliza_engine::Engine;
use eliza_memory::{Speaker, TranscriptLog};
use eliza_types::{ChatRequest, ChatResponse, DEFAULT_USER_NAME, ElizaError};
use serde_json::{Value, json};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::sessions::SessionStore;

/// Default TCP port for the chat server.
pub const DEFAULT_PORT: u16 = 8000;

/// Largest request (headers plus body) the server will read.
const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// How long a client has to deliver a complete request.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// The compiled-in chat page.
const CHAT_HTML: &str = include_str!("chat.html");

// ---------------------------------------------------------------------------
// ChatService
// ---------------------------------------------------------------------------

/// Transport-independent request handling: sessions, name resolution, the
/// engine call, and transcript logging.
pub struct ChatService {
    engine: Engine,
    sessions: Mutex<SessionStore>,
    transcript: Option<Mutex<TranscriptLog>>,
    default_user_name: String,
}

impl ChatService {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            sessions: Mutex::new(SessionStore::default()),
            transcript: None,
            default_user_name: DEFAULT_USER_NAME.to_string(),
        }
    }

    /// Name returned when the user has not given one.
    pub fn with_default_user_name(mut self, name: impl Into<String>) -> Self {
        self.default_user_name = name.into();
        self
    }

    /// Record every turn in `log`.
    pub fn with_transcript(mut self, log: TranscriptLog) -> Self {
        self.transcript = Some(Mutex::new(log));
        self
    }

    /// Replace the session store (e.g. with a different capacity).
    pub fn with_sessions(mut self, store: SessionStore) -> Self {
        self.sessions = Mutex::new(store);
        self
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Answer one chat request.
    ///
    /// A client-supplied `user_name` other than the placeholder seeds the
    /// memory of a newly created session.  The returned name is, in order of
    /// preference: that explicit name, the name the session's memory holds,
    /// the default placeholder.  A farewell closes the session.
    pub async fn handle_chat(&self, request: ChatRequest) -> ChatResponse {
        let explicit = self.explicit_name(request.user_name.as_deref());

        let (session_id, reply, remembered) = {
            let mut sessions = self.sessions.lock().await;
            let checkout = sessions.checkout(request.session_id.as_deref());
            if checkout.created
                && let Some(name) = &explicit
            {
                checkout.memory.acquire_name(name);
            }
            let reply = self.engine.respond(&request.message, checkout.memory);
            let remembered = checkout.memory.name.clone();
            let id = checkout.id;
            if reply.farewell {
                sessions.close(&id);
            }
            (id, reply, remembered)
        };

        if let Some(log) = &self.transcript {
            let log = log.lock().await;
            log.log(&session_id, Speaker::User, &request.message);
            log.log(&session_id, Speaker::Eliza, &reply.text);
        }

        let user_name = explicit
            .or(remembered)
            .unwrap_or_else(|| self.default_user_name.clone());
        debug!(session = %session_id, farewell = reply.farewell, "chat turn answered");

        ChatResponse {
            reply: reply.text,
            user_name,
            session_id,
            farewell: reply.farewell,
        }
    }

    fn explicit_name(&self, name: Option<&str>) -> Option<String> {
        let name = name?.trim();
        if name.is_empty()
            || name.eq_ignore_ascii_case(&self.default_user_name)
            || name.eq_ignore_ascii_case(DEFAULT_USER_NAME)
        {
            return None;
        }
        Some(name.to_string())
    }
}

// ---------------------------------------------------------------------------
// ChatServer
// ---------------------------------------------------------------------------

/// HTTP server wrapping a [`ChatService`].
///
/// ```rust,no_run
/// use eliza_engine::Engine;
/// use eliza_web::{ChatServer, ChatService};
///
/// #[tokio::main]
/// async fn main() {
///     ChatServer::new(ChatService::new(Engine::default()))
///         .with_port(8000)
///         .run()
///         .await
///         .expect("chat server failed");
/// }
/// ```
pub struct ChatServer {
    service: Arc<ChatService>,
    port: u16,
    read_timeout: Duration,
}

impl ChatServer {
    pub fn new(service: ChatService) -> Self {
        Self {
            service: Arc::new(service),
            port: DEFAULT_PORT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Override how long a client may take to send its request.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Override the listening port (builder-style).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn service(&self) -> Arc<ChatService> {
        Arc::clone(&self.service)
    }

    /// Accept connections until the process exits.
    ///
    /// # Errors
    ///
    /// Returns [`ElizaError::Server`] if the listener cannot bind.
    pub async fn run(self) -> Result<(), ElizaError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ElizaError::Server(format!("bind error on {addr}: {e}")))?;
        info!(port = self.port, "chat server listening on http://localhost:{}", self.port);
        self.serve(listener).await;
        Ok(())
    }

    /// Serve connections from an already bound listener.
    pub async fn serve(self, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let service = Arc::clone(&self.service);
                    let read_timeout = self.read_timeout;
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &service, read_timeout).await {
                            warn!(%peer, error = %e, "client error");
                        }
                    });
                }
                Err(e) => warn!(error = %e, "accept error"),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Per-connection handler
// ---------------------------------------------------------------------------

/// A parsed HTTP/1.1 request line plus body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HttpRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

struct HttpResponse {
    status: &'static str,
    content_type: &'static str,
    body: String,
}

impl HttpResponse {
    fn json(status: &'static str, value: &Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string(),
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        format!(
            "HTTP/1.1 {}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n\
             {}",
            self.status,
            self.content_type,
            self.body.len(),
            self.body
        )
        .into_bytes()
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    service: &ChatService,
    read_timeout: Duration,
) -> Result<(), ElizaError> {
    let response = match read_request(&mut stream, read_timeout).await {
        Ok(raw) => match parse_http_request(&raw) {
            Some(request) => route(request, service).await,
            None => HttpResponse::json("400 Bad Request", &json!({ "error": "malformed request" })),
        },
        Err(Rejection::Io(e)) => return Err(ElizaError::Server(format!("HTTP read error: {e}"))),
        Err(rejection) => {
            debug!(?rejection, "request rejected before routing");
            rejection.into_response()
        }
    };
    stream
        .write_all(&response.into_bytes())
        .await
        .map_err(|e| ElizaError::Server(format!("HTTP write error: {e}")))?;
    Ok(())
}

async fn route(request: HttpRequest, service: &ChatService) -> HttpResponse {
    debug!(method = %request.method, path = %request.path, "request");
    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/") => HttpResponse {
            status: "200 OK",
            content_type: "text/html; charset=utf-8",
            body: CHAT_HTML.to_string(),
        },
        ("POST", "/chat") => {
            let chat = parse_chat_request(&request.body);
            let reply = service.handle_chat(chat).await;
            match serde_json::to_value(&reply) {
                Ok(body) => HttpResponse::json("200 OK", &body),
                Err(e) => HttpResponse::json(
                    "500 Internal Server Error",
                    &json!({ "error": e.to_string() }),
                ),
            }
        }
        ("GET", "/health") => HttpResponse::json(
            "200 OK",
            &json!({ "status": "ok", "sessions": service.session_count().await }),
        ),
        (_, "/" | "/chat" | "/health") => {
            HttpResponse::json("405 Method Not Allowed", &json!({ "error": "method not allowed" }))
        }
        _ => HttpResponse::json("404 Not Found", &json!({ "error": "not found" })),
    }
}

/// Why a request was answered without reaching the router.
#[derive(Debug)]
enum Rejection {
    TooLarge,
    TimedOut,
    Chunked,
    Io(std::io::Error),
}

impl Rejection {
    fn into_response(self) -> HttpResponse {
        match self {
            Rejection::TooLarge => HttpResponse::json(
                "413 Payload Too Large",
                &json!({ "error": format!("request larger than {MAX_REQUEST_BYTES} bytes") }),
            ),
            Rejection::TimedOut => HttpResponse::json(
                "408 Request Timeout",
                &json!({ "error": "request not received in time" }),
            ),
            Rejection::Chunked => HttpResponse::json(
                "411 Length Required",
                &json!({ "error": "chunked bodies are not supported; send Content-Length" }),
            ),
            Rejection::Io(e) => {
                HttpResponse::json("400 Bad Request", &json!({ "error": e.to_string() }))
            }
        }
    }
}

/// Read one request, giving up after `deadline`.
async fn read_request<S: AsyncRead + Unpin>(
    stream: &mut S,
    deadline: Duration,
) -> Result<Vec<u8>, Rejection> {
    match tokio::time::timeout(deadline, read_until_complete(stream)).await {
        Ok(result) => result,
        Err(_) => Err(Rejection::TimedOut),
    }
}

/// Read until the headers are complete and `Content-Length` bytes of body
/// have arrived, or the peer stops sending.
async fn read_until_complete<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Vec<u8>, Rejection> {
    let mut buf = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.map_err(Rejection::Io)?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > MAX_REQUEST_BYTES {
            return Err(Rejection::TooLarge);
        }
        if let Some(end) = header_end(&buf) {
            let headers = String::from_utf8_lossy(&buf[..end]);
            if is_chunked(&headers) {
                return Err(Rejection::Chunked);
            }
            let expected = end + 4 + content_length(&headers);
            if expected > MAX_REQUEST_BYTES {
                return Err(Rejection::TooLarge);
            }
            if buf.len() >= expected {
                break;
            }
        }
    }
    Ok(buf)
}

fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn header_value<'a>(headers: &'a str, name: &str) -> Option<&'a str> {
    headers
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim())
}

fn content_length(headers: &str) -> usize {
    header_value(headers, "content-length")
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

fn is_chunked(headers: &str) -> bool {
    header_value(headers, "transfer-encoding")
        .is_some_and(|value| value.to_ascii_lowercase().contains("chunked"))
}

pub(crate) fn parse_http_request(raw: &[u8]) -> Option<HttpRequest> {
    let end = header_end(raw)?;
    let head = String::from_utf8_lossy(&raw[..end]);
    let mut request_line = head.lines().next()?.split_whitespace();
    let method = request_line.next()?.to_ascii_uppercase();
    let target = request_line.next()?;
    let path = target.split('?').next().unwrap_or(target).to_string();

    let declared = content_length(&head);
    let body_bytes = &raw[end + 4..];
    let body_bytes = &body_bytes[..declared.min(body_bytes.len())];
    Some(HttpRequest {
        method,
        path,
        body: String::from_utf8_lossy(body_bytes).into_owned(),
    })
}

// ---------------------------------------------------------------------------
// Request body coercion
// ---------------------------------------------------------------------------

/// Turn any body into a [`ChatRequest`].
///
/// Non-JSON bodies become an empty message.  `null` fields count as absent,
/// strings are taken as they are, and any other JSON value is rendered to its
/// text form.  The message is trimmed; blank names and session ids are
/// dropped.
pub fn parse_chat_request(body: &str) -> ChatRequest {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return ChatRequest::default();
    };
    let non_blank = |s: &String| !s.trim().is_empty();

    ChatRequest {
        message: coerce(json.get("message"))
            .map(|m| m.trim().to_string())
            .unwrap_or_default(),
        user_name: coerce(json.get("user_name")).filter(non_blank),
        session_id: coerce(json.get("session_id")).filter(non_blank),
    }
}

fn coerce(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ChatService {
        ChatService::new(Engine::default())
    }

    fn request(message: &str, user_name: Option<&str>, session_id: Option<&str>) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            user_name: user_name.map(str::to_string),
            session_id: session_id.map(str::to_string),
        }
    }

    // ── ChatServer constructor ────────────────────────────────────────────────

    #[test]
    fn default_port_is_8000() {
        assert_eq!(ChatServer::new(service()).port(), DEFAULT_PORT);
        assert_eq!(DEFAULT_PORT, 8000);
    }

    #[test]
    fn with_port_overrides_default() {
        assert_eq!(ChatServer::new(service()).with_port(9999).port(), 9999);
    }

    // ── Body coercion ─────────────────────────────────────────────────────────

    #[test]
    fn chat_request_from_json() {
        let req = parse_chat_request(r#"{"message":"  hi there ","user_name":"Sam","session_id":"abc"}"#);
        assert_eq!(req, request("hi there", Some("Sam"), Some("abc")));
    }

    #[test]
    fn chat_request_coerces_odd_values() {
        let req = parse_chat_request(r#"{"message":42,"user_name":null,"session_id":"  "}"#);
        assert_eq!(req, request("42", None, None));

        let req = parse_chat_request(r#"{"message":true}"#);
        assert_eq!(req.message, "true");
    }

    #[test]
    fn chat_request_from_garbage() {
        assert_eq!(parse_chat_request("not json at all"), ChatRequest::default());
        assert_eq!(parse_chat_request(""), ChatRequest::default());
        assert_eq!(parse_chat_request("[1,2]"), ChatRequest::default());
    }

    // ── HTTP parsing ──────────────────────────────────────────────────────────

    #[test]
    fn http_request_line_and_body() {
        let raw = b"POST /chat?x=1 HTTP/1.1\r\nHost: a\r\nContent-Length: 5\r\n\r\nhello";
        let req = parse_http_request(raw).expect("parsed");
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/chat");
        assert_eq!(req.body, "hello");
    }

    #[test]
    fn http_body_is_cut_at_content_length() {
        let raw = b"POST /chat HTTP/1.1\r\ncontent-length: 2\r\n\r\nhello";
        assert_eq!(parse_http_request(raw).expect("parsed").body, "he");
    }

    #[test]
    fn http_without_header_end_is_rejected() {
        assert!(parse_http_request(b"GET / HTTP/1.1\r\nHost: a").is_none());
    }

    // ── Chat handling ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn placeholder_name_is_returned_until_user_introduces_themselves() {
        let svc = service();
        let first = svc.handle_chat(request("hello", Some("Sweetheart"), None)).await;
        assert_eq!(first.user_name, "Sweetheart");
        assert!(first.reply.contains("name"));

        let second = svc
            .handle_chat(request("My name is Sam", Some("Sweetheart"), Some(&first.session_id)))
            .await;
        assert_eq!(second.session_id, first.session_id);
        assert_eq!(second.user_name, "Sam");
        assert!(second.reply.contains("Sam"));
    }

    #[tokio::test]
    async fn explicit_name_seeds_new_session() {
        let svc = service();
        let resp = svc.handle_chat(request("I feel great today", Some("Lena"), None)).await;
        assert_eq!(resp.user_name, "Lena");
        assert!(!resp.reply.contains("tell me your name"), "{}", resp.reply);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let svc = service();
        let a = svc.handle_chat(request("call me Ana", None, None)).await;
        let b = svc.handle_chat(request("hello", None, None)).await;
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(a.user_name, "Ana");
        assert_eq!(b.user_name, DEFAULT_USER_NAME);
        assert_eq!(svc.session_count().await, 2);
    }

    #[tokio::test]
    async fn farewell_closes_session() {
        let svc = service();
        let a = svc.handle_chat(request("call me Ana", None, None)).await;
        let bye = svc.handle_chat(request("bye", None, Some(&a.session_id))).await;
        assert!(bye.farewell);
        assert!(bye.reply.contains("Ana"));
        assert_eq!(svc.session_count().await, 0);
    }

    #[tokio::test]
    async fn custom_default_name() {
        let svc = service().with_default_user_name("Friend");
        let resp = svc.handle_chat(request("", None, None)).await;
        assert_eq!(resp.user_name, "Friend");
        assert!(!resp.reply.is_empty());
    }

    #[tokio::test]
    async fn transcript_records_both_sides() {
        let svc = service().with_transcript(TranscriptLog::open_in_memory().expect("sqlite"));
        let resp = svc.handle_chat(request("My name is Kai", None, None)).await;
        let log = svc.transcript.as_ref().expect("transcript").lock().await;
        let turns = log.session(&resp.session_id).expect("read back");
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker, Speaker::User);
        assert_eq!(turns[0].text, "My name is Kai");
        assert_eq!(turns[1].text, resp.reply);
    }

    // ── Routing ───────────────────────────────────────────────────────────────

    fn http(method: &str, path: &str, body: &str) -> HttpRequest {
        HttpRequest {
            method: method.to_string(),
            path: path.to_string(),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn routes_answer_with_expected_status() {
        let svc = service();
        assert_eq!(route(http("GET", "/", ""), &svc).await.status, "200 OK");
        assert_eq!(route(http("GET", "/health", ""), &svc).await.status, "200 OK");
        assert_eq!(route(http("GET", "/chat", ""), &svc).await.status, "405 Method Not Allowed");
        assert_eq!(route(http("GET", "/nope", ""), &svc).await.status, "404 Not Found");

        let chat = route(http("POST", "/chat", r#"{"message":"hi"}"#), &svc).await;
        assert_eq!(chat.status, "200 OK");
        let body: Value = serde_json::from_str(&chat.body).expect("json body");
        assert!(body["reply"].as_str().is_some_and(|r| !r.is_empty()));
        assert!(body["session_id"].as_str().is_some());
    }

    #[tokio::test]
    async fn end_to_end_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(ChatServer::new(service()).serve(listener));

        let mut stream = TcpStream::connect(addr).await.expect("connect");
        let body = r#"{"message":"My name is Rui"}"#;
        let req = format!(
            "POST /chat HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(req.as_bytes()).await.expect("write");
        let mut response = String::new();
        stream.read_to_string(&mut response).await.expect("read");

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("\"user_name\":\"Rui\""));
    }

    // ── Request reading limits ────────────────────────────────────────────────

    async fn exchange(server: ChatServer, request: &[u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(server.serve(listener));

        let mut stream = TcpStream::connect(addr).await.expect("connect");
        stream.write_all(request).await.expect("write");
        let mut response = String::new();
        tokio::time::timeout(Duration::from_secs(5), stream.read_to_string(&mut response))
            .await
            .expect("server answered before the test deadline")
            .expect("read");
        response
    }

    #[tokio::test]
    async fn stalled_request_gets_408() {
        let server = ChatServer::new(service()).with_read_timeout(Duration::from_millis(100));
        // Declares 50 bytes of body, sends one, then goes quiet.
        let response = exchange(server, b"POST /chat HTTP/1.1\r\nContent-Length: 50\r\n\r\n{").await;
        assert!(response.starts_with("HTTP/1.1 408 Request Timeout"), "{response}");
    }

    #[tokio::test]
    async fn partial_headers_get_408() {
        let server = ChatServer::new(service()).with_read_timeout(Duration::from_millis(100));
        let response = exchange(server, b"POST /chat HTTP/1.1\r\nHost: a").await;
        assert!(response.starts_with("HTTP/1.1 408"), "{response}");
    }

    #[tokio::test]
    async fn oversized_declared_body_gets_413() {
        let request = format!(
            "POST /chat HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
            MAX_REQUEST_BYTES * 2
        );
        let response = exchange(ChatServer::new(service()), request.as_bytes()).await;
        assert!(response.starts_with("HTTP/1.1 413 Payload Too Large"), "{response}");
    }

    #[tokio::test]
    async fn chunked_body_gets_411() {
        let response = exchange(
            ChatServer::new(service()),
            b"POST /chat HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 411 Length Required"), "{response}");
    }

    #[tokio::test]
    async fn oversized_bytes_are_rejected_while_reading() {
        let mut raw = b"POST /chat HTTP/1.1\r\nHost: a\r\n".to_vec();
        raw.extend(std::iter::repeat_n(b'x', MAX_REQUEST_BYTES + 1));
        let mut input: &[u8] = &raw;
        let result = read_request(&mut input, DEFAULT_READ_TIMEOUT).await;
        assert!(matches!(result, Err(Rejection::TooLarge)), "{result:?}");
    }

    #[tokio::test]
    async fn complete_request_is_read_in_full() {
        let mut input: &[u8] = b"POST /chat HTTP/1.1\r\nContent-Length: 2\r\n\r\n{}";
        let raw = read_request(&mut input, DEFAULT_READ_TIMEOUT).await.expect("read");
        assert_eq!(parse_http_request(&raw).expect("parsed").body, "{}");
    }

    // ── Transcript failures ───────────────────────────────────────────────────

    #[tokio::test]
    async fn failing_transcript_does_not_break_the_turn() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("transcript.db");
        let path = path.to_string_lossy().into_owned();
        let svc = service().with_transcript(TranscriptLog::open(&path).expect("open"));

        rusqlite::Connection::open(&path)
            .expect("second connection")
            .execute_batch("DROP TABLE transcript;")
            .expect("drop table");

        let resp = svc.handle_chat(request("My name is Noor", None, None)).await;
        assert!(resp.reply.contains("Noor"), "{}", resp.reply);
        assert_eq!(resp.user_name, "Noor");

        let next = svc
            .handle_chat(request("I feel great", None, Some(&resp.session_id)))
            .await;
        assert!(!next.reply.is_empty());
    }

    // ── HTML embedding ────────────────────────────────────────────────────────

    #[test]
    fn chat_html_posts_to_chat_endpoint() {
        assert!(CHAT_HTML.contains("/chat"));
        assert!(CHAT_HTML.contains("session_id"));
    }
}
