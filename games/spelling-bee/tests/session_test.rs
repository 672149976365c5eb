use core_logic::{CoreError, IdentityProfile, Outcome, Session, SessionError};
use spelling_bee::{BeeConfig, BeeSession};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
struct Request {
    method: String,
    path: String,
    body: String,
}

#[derive(Debug, Clone)]
struct Reply {
    status: u16,
    body: String,
    set_cookie: Option<&'static str>,
    delay: Duration,
}

impl Reply {
    fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            set_cookie: None,
            delay: Duration::ZERO,
        }
    }

    fn json(message: &str, score: i64, count: i64) -> Self {
        Self {
            body: format!(
                r#"{{"message": "{}", "score": {}, "count": {}, "victory": false}}"#,
                message, score, count
            ),
            ..Self::status(200)
        }
    }

    fn with_csrf(mut self) -> Self {
        self.set_cookie = Some("csrftoken=abc123; Path=/");
        self
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Handler = Arc<dyn Fn(&Request) -> Reply + Send + Sync>;

/// Minimal HTTP/1.1 game server: one request per connection, canned replies.
struct FakeGame {
    base_url: String,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl FakeGame {
    async fn start(handler: impl Fn(&Request) -> Reply + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Handler = Arc::new(handler);

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = Arc::clone(&handler);
                let log = Arc::clone(&log);
                tokio::spawn(async move { serve(stream, handler, log).await });
            }
        });

        Self { base_url, requests }
    }

    /// Standard site: csrf cookie on `/`, `register` status on `/login/`,
    /// `login` status on `/login/?next=/`, `word` on `/word/`.
    async fn site(register: u16, login: u16, word: Reply) -> Self {
        Self::start(move |req| match (req.method.as_str(), req.path.as_str()) {
            ("GET", "/") => Reply::status(200).with_csrf(),
            ("POST", "/login/") => Reply::status(register),
            ("POST", "/login/?next=/") => Reply::status(login),
            ("POST", "/word/") => word.clone(),
            _ => Reply::status(404),
        })
        .await
    }

    fn session(&self, attempt_timeout_ms: u64) -> BeeSession {
        let config = BeeConfig {
            base_url: self.base_url.clone(),
            attempt_timeout_ms,
            ..BeeConfig::default()
        };
        BeeSession::new(
            IdentityProfile::new("Bot 1", "notreal@example.com"),
            &config,
            None,
        )
        .unwrap()
    }

    fn requests_to(&self, path: &str) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

async fn serve(mut stream: TcpStream, handler: Handler, log: Arc<Mutex<Vec<Request>>>) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    let reply = handler(&request);
    log.lock().unwrap().push(request);

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    let cookie = reply
        .set_cookie
        .map(|c| format!("Set-Cookie: {}\r\n", c))
        .unwrap_or_default();
    let response = format!(
        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n{}",
        reply.status,
        reply.body.len(),
        cookie,
        reply.body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..end]).to_string();

    Some(Request { method, path, body })
}

#[tokio::test]
async fn test_existing_account_falls_back_to_login() {
    let game = FakeGame::site(500, 200, Reply::json("Good job!", 10, 1)).await;
    let session = game.session(1000);

    let outcome = session.attempt("123456").await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Accepted {
            score: 10,
            count: 1,
            victory: false
        }
    );

    let registrations = game.requests_to("/login/");
    assert_eq!(registrations.len(), 1);
    assert!(registrations[0].body.contains("form-type=registration"));
    assert!(registrations[0].body.contains("csrfmiddlewaretoken=abc123"));

    let logins = game.requests_to("/login/?next=/");
    assert_eq!(logins.len(), 1);
    assert!(logins[0].body.contains("form-type=login"));
    assert!(logins[0].body.contains("csrfmiddlewaretoken=abc123"));

    let words = game.requests_to("/word/");
    assert_eq!(words.len(), 1);
    assert!(words[0].body.contains(r#""numeric_word":"123456""#));
}

#[tokio::test]
async fn test_new_account_skips_login_and_initializes_once() {
    let game = FakeGame::site(200, 200, Reply::json("You already found this word!", 0, 0)).await;
    let session = game.session(1000);

    assert_eq!(session.attempt("111111").await.unwrap(), Outcome::Duplicate);
    assert_eq!(session.attempt("111112").await.unwrap(), Outcome::Duplicate);

    assert_eq!(game.requests_to("/").len(), 1);
    assert_eq!(game.requests_to("/login/").len(), 1);
    assert!(game.requests_to("/login/?next=/").is_empty());
    assert_eq!(game.requests_to("/word/").len(), 2);
}

#[tokio::test]
async fn test_wrong_guess_is_invalid() {
    let game = FakeGame::site(200, 200, Reply::json("Not in word list", 0, 0)).await;
    let session = game.session(1000);

    assert_eq!(session.attempt("777777").await.unwrap(), Outcome::Invalid);
}

#[tokio::test]
async fn test_forbidden_word_is_rate_limited() {
    let game = FakeGame::site(200, 200, Reply::status(403)).await;
    let session = game.session(1000);

    assert_eq!(session.attempt("123456").await.unwrap(), Outcome::RateLimited);
}

#[tokio::test]
async fn test_slow_word_is_rate_limited() {
    let slow = Reply::json("Good job!", 10, 1).delayed(Duration::from_secs(3));
    let game = FakeGame::site(200, 200, slow).await;
    let session = game.session(200);

    assert_eq!(session.attempt("123456").await.unwrap(), Outcome::RateLimited);
}

#[tokio::test]
async fn test_other_word_status_is_transport_error() {
    let game = FakeGame::site(200, 200, Reply::status(502)).await;
    let session = game.session(1000);

    let outcome = session.attempt("123456").await.unwrap();
    assert!(matches!(outcome, Outcome::TransportError(reason) if reason.contains("502")));
}

#[tokio::test]
async fn test_undecodable_word_body_is_transport_error() {
    let garbage = Reply {
        body: "<html>oops</html>".to_string(),
        ..Reply::status(200)
    };
    let game = FakeGame::site(200, 200, garbage).await;
    let session = game.session(1000);

    assert!(matches!(
        session.attempt("123456").await.unwrap(),
        Outcome::TransportError(_)
    ));
}

#[tokio::test]
async fn test_missing_csrf_cookie_fails_initialization() {
    let game = FakeGame::start(|_| Reply::status(200)).await;
    let session = game.session(1000);

    let err = session.ensure_ready().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Session(SessionError::NoCsrfToken { .. })
    ));

    // The failure is remembered; no second exchange and no word is sent.
    let err = session.attempt("123456").await.unwrap_err();
    assert!(matches!(err, CoreError::Session(SessionError::InitFailed { .. })));
    assert_eq!(game.requests_to("/").len(), 1);
    assert!(game.requests_to("/word/").is_empty());
}

#[tokio::test]
async fn test_rejected_login_fails_initialization() {
    let game = FakeGame::site(500, 403, Reply::json("Good job!", 10, 1)).await;
    let session = game.session(1000);

    let err = session.ensure_ready().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Session(SessionError::LoginFailed { status: 403, .. })
    ));
    assert!(game.requests_to("/word/").is_empty());
}

#[tokio::test]
async fn test_rejected_registration_fails_initialization() {
    let game = FakeGame::site(400, 200, Reply::json("Good job!", 10, 1)).await;
    let session = game.session(1000);

    let err = session.ensure_ready().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Session(SessionError::RegistrationFailed { .. })
    ));
}
