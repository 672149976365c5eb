//! HTTP session for one spelling-bee player.
//!
//! A session owns its own cookie jar and client. The first call to
//! [`Session::ensure_ready`] fetches the site root for the `csrftoken` cookie,
//! registers the player and falls back to logging in when the account already
//! exists. Word submissions on the same session are serialized.

use crate::config::BeeConfig;
use async_trait::async_trait;
use core_logic::{
    ConfigError, CoreError, IdentityProfile, InitGuard, Outcome, ProxyConfig, Session,
    SessionError, SessionFactory, WORD_RESULT_TARGET,
};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const CSRF_COOKIE: &str = "csrftoken";
pub const SUCCESS_MESSAGE: &str = "Good job!";
pub const ALREADY_FOUND_MESSAGE: &str = "You already found this word!";

#[derive(Debug, Serialize)]
struct WordRequest<'a> {
    numeric_word: &'a str,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WordResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub victory: bool,
}

/// Maps a decoded `/word/` body to an outcome.
pub fn classify_response(response: &WordResponse) -> Outcome {
    match response.message.as_str() {
        SUCCESS_MESSAGE => Outcome::Accepted {
            score: response.score,
            count: response.count,
            victory: response.victory,
        },
        ALREADY_FOUND_MESSAGE => Outcome::Duplicate,
        _ => Outcome::Invalid,
    }
}

/// Pulls the `csrftoken` value out of a `Cookie` header string.
pub fn extract_csrf_token(cookie_header: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone)]
struct Endpoints {
    root: Url,
    login: Url,
    login_next: Url,
    word: Url,
}

impl Endpoints {
    fn new(base_url: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidUrl {
            url: base_url.to_string(),
        };
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let root = Url::parse(&normalized).map_err(|_| invalid())?;
        Ok(Self {
            login: root.join("login/").map_err(|_| invalid())?,
            login_next: root.join("login/?next=/").map_err(|_| invalid())?,
            word: root.join("word/").map_err(|_| invalid())?,
            root,
        })
    }
}

pub struct BeeSession {
    profile: IdentityProfile,
    client: Client,
    jar: Arc<Jar>,
    endpoints: Endpoints,
    team_name: String,
    attempt_timeout: Duration,
    /// Holds the csrf token once registration or login went through.
    ready: InitGuard<String>,
    submit_lock: Mutex<()>,
}

impl BeeSession {
    pub fn new(
        profile: IdentityProfile,
        config: &BeeConfig,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Self, CoreError> {
        let endpoints = Endpoints::new(&config.base_url)?;
        let jar = Arc::new(Jar::default());

        let build_err = |e: reqwest::Error| SessionError::ClientBuild {
            reason: e.to_string(),
        };
        let mut client_builder = Client::builder().cookie_provider(Arc::clone(&jar));
        if let Some(proxy_conf) = proxy {
            let mut proxy = reqwest::Proxy::all(&proxy_conf.url).map_err(build_err)?;
            if let (Some(u), Some(p)) = (&proxy_conf.username, &proxy_conf.password) {
                proxy = proxy.basic_auth(u, p);
            }
            client_builder = client_builder.proxy(proxy);
        }
        let client = client_builder.build().map_err(build_err)?;

        Ok(Self {
            profile,
            client,
            jar,
            endpoints,
            team_name: config.team_name.clone(),
            attempt_timeout: config.attempt_timeout(),
            ready: InitGuard::new(),
            submit_lock: Mutex::new(()),
        })
    }

    async fn initialize(&self) -> Result<String, CoreError> {
        let token = self.fetch_csrf_token().await?;
        if self.register(&token).await? {
            debug!("[{}] account exists, logging in", self.profile.name);
            self.login(&token).await?;
        }
        info!("[{}] session ready", self.profile.name);
        Ok(token)
    }

    async fn fetch_csrf_token(&self) -> Result<String, CoreError> {
        let root = &self.endpoints.root;
        let res = self
            .client
            .get(root.clone())
            .send()
            .await
            .map_err(|e| request_err(root, e))?;
        res.bytes().await.map_err(|e| request_err(root, e))?;

        let token = self
            .jar
            .cookies(root)
            .and_then(|header| header.to_str().ok().and_then(extract_csrf_token));

        token.ok_or_else(|| {
            SessionError::NoCsrfToken {
                endpoint: root.to_string(),
            }
            .into()
        })
    }

    /// Returns `true` when the account already exists and a login is needed.
    async fn register(&self, token: &str) -> Result<bool, CoreError> {
        let url = &self.endpoints.login;
        let form = [
            ("csrfmiddlewaretoken", token),
            ("form-type", "registration"),
            ("team_name", self.team_name.as_str()),
            ("your_name", self.profile.name.as_str()),
            ("email", self.profile.email.as_str()),
        ];
        let res = self
            .client
            .post(url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| request_err(url, e))?;
        let status = res.status();
        res.bytes().await.map_err(|e| request_err(url, e))?;

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            return Ok(true);
        }
        if status.is_client_error() || status.is_server_error() {
            return Err(SessionError::RegistrationFailed {
                name: self.profile.name.clone(),
                reason: format!("HTTP {}", status),
            }
            .into());
        }
        Ok(false)
    }

    async fn login(&self, token: &str) -> Result<(), CoreError> {
        let url = &self.endpoints.login_next;
        let form = [
            ("csrfmiddlewaretoken", token),
            ("form-type", "login"),
            ("email", self.profile.email.as_str()),
        ];
        let res = self
            .client
            .post(url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| request_err(url, e))?;
        let status = res.status();
        let body = res.text().await.map_err(|e| request_err(url, e))?;

        if !status.is_success() {
            return Err(SessionError::LoginFailed {
                email: self.profile.email.clone(),
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(())
    }

    async fn submit(&self, word: &str) -> Outcome {
        let res = self
            .client
            .post(self.endpoints.word.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.attempt_timeout)
            .json(&WordRequest { numeric_word: word })
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(e) if e.is_timeout() => return Outcome::RateLimited,
            Err(e) => return Outcome::TransportError(e.to_string()),
        };

        let status = res.status();
        if status == StatusCode::FORBIDDEN {
            return Outcome::RateLimited;
        }
        if !status.is_success() {
            return Outcome::TransportError(format!("HTTP {}", status));
        }

        match res.json::<WordResponse>().await {
            Ok(body) => classify_response(&body),
            Err(e) if e.is_timeout() => Outcome::RateLimited,
            Err(e) => Outcome::TransportError(format!("decode response: {}", e)),
        }
    }
}

fn request_err(url: &Url, e: reqwest::Error) -> CoreError {
    SessionError::Request {
        endpoint: url.to_string(),
        reason: e.to_string(),
    }
    .into()
}

#[async_trait]
impl Session for BeeSession {
    fn profile(&self) -> &IdentityProfile {
        &self.profile
    }

    async fn ensure_ready(&self) -> Result<(), CoreError> {
        self.ready.get_or_init(|| self.initialize()).await?;
        Ok(())
    }

    async fn attempt(&self, word: &str) -> Result<Outcome, CoreError> {
        self.ensure_ready().await?;

        let _guard = self.submit_lock.lock().await;
        let outcome = self.submit(word).await;

        match &outcome {
            Outcome::Accepted {
                score,
                count,
                victory,
            } => info!(
                target: WORD_RESULT_TARGET,
                "[{}] {}: SCORE: {}, COUNT: {}, VICTORY: {}",
                self.profile.name,
                word,
                score,
                count,
                victory
            ),
            other => debug!("[{}] {}: {:?}", self.profile.name, word, other),
        }
        Ok(outcome)
    }
}

/// Creates sessions, handing out proxies round-robin when any are loaded.
pub struct BeeSessionFactory {
    config: BeeConfig,
    proxies: Vec<ProxyConfig>,
    next_proxy: AtomicUsize,
}

impl BeeSessionFactory {
    pub fn new(config: &BeeConfig, proxies: Vec<ProxyConfig>) -> Result<Self, CoreError> {
        Endpoints::new(&config.base_url)?;
        Ok(Self {
            config: config.clone(),
            proxies,
            next_proxy: AtomicUsize::new(0),
        })
    }

    fn assign_proxy(&self) -> Option<&ProxyConfig> {
        if self.proxies.is_empty() {
            return None;
        }
        let idx = self.next_proxy.fetch_add(1, Ordering::Relaxed) % self.proxies.len();
        self.proxies.get(idx)
    }
}

impl SessionFactory for BeeSessionFactory {
    type Session = BeeSession;

    fn create(&self, profile: IdentityProfile) -> Result<BeeSession, CoreError> {
        let proxy = self.assign_proxy();
        if let Some(p) = proxy {
            debug!("[{}] using proxy {}", profile.name, p.url);
        }
        BeeSession::new(profile, &self.config, proxy)
    }
}
