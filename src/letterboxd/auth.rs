use std::sync::Arc;

use reqwest::{
    Client, Url,
    cookie::{CookieStore, Jar},
};
use scraper::Html;

use crate::{Error, Res, types::LoginResponse};

pub const DEFAULT_BASE_URL: &str = "https://letterboxd.com";

const CSRF_COOKIE: &str = "com.xk72.webparts.csrf";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A browser-like session on the Letterboxd web site.
pub struct LetterboxdSession {
    pub(super) http: Client,
    jar: Arc<Jar>,
    pub(super) base_url: Url,
    logged_in: bool,
}

impl LetterboxdSession {
    /// Creates a logged-out session against letterboxd.com.
    pub fn new() -> Res<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a logged-out session against another site root.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Site root such as `http://127.0.0.1:8080`
    ///
    /// # Example
    ///
    /// ```
    /// let mut session = LetterboxdSession::with_base_url("http://127.0.0.1:8080")?;
    /// session.login("cinephile", "hunter2").await?;
    /// ```
    pub fn with_base_url(base_url: &str) -> Res<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Other(format!("Invalid Letterboxd URL {}: {}", base_url, e)))?;

        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            jar,
            base_url,
            logged_in: false,
        })
    }

    pub fn logged_in(&self) -> bool {
        self.logged_in
    }

    pub(super) fn url(&self, path: &str) -> Res<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Other(format!("Invalid Letterboxd path {}: {}", path, e)))
    }

    /// Logs in with the account credentials.
    ///
    /// The first GET sets the CSRF cookie; its value goes back as the
    /// `__csrf` form field. A non-2xx answer, or any `result` other than
    /// `success`, fails with [`Error::Auth`].
    pub async fn login(&mut self, username: &str, password: &str) -> Res<()> {
        let home = self.url("/")?;
        tracing::debug!(url = %home, "initialising session");
        self.http.get(home.clone()).send().await?.error_for_status()?;

        let csrf = self
            .cookie(&home, CSRF_COOKIE)
            .ok_or_else(|| Error::Auth("the site did not hand out a CSRF token".to_string()))?;

        let login_url = self.url("/user/login.do")?;
        tracing::debug!(url = %login_url, %username, "posting login form");
        let response = self
            .http
            .post(login_url.clone())
            .form(&[
                ("username", username),
                ("password", password),
                ("__csrf", csrf.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "login form rejected");
            return Err(Error::Auth(format!(
                "the login form was rejected with status {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )));
        }
        let body = response.text().await?;
        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|e| Error::UnexpectedResponse {
                url: login_url.to_string(),
                reason: e.to_string(),
            })?;

        if login.result != "success" {
            let reason = if login.messages.is_empty() {
                format!("login answered '{}'", login.result)
            } else {
                login
                    .messages
                    .iter()
                    .map(|m| strip_html(m))
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            return Err(Error::Auth(reason));
        }

        tracing::info!(%username, "logged in to Letterboxd");
        self.logged_in = true;
        Ok(())
    }

    fn cookie(&self, url: &Url, name: &str) -> Option<String> {
        let header = self.jar.cookies(url)?;
        let header = header.to_str().ok()?;
        header.split(';').map(str::trim).find_map(|pair| {
            pair.split_once('=')
                .filter(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        })
    }
}

/// Letterboxd sends login messages as HTML fragments.
fn strip_html(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}
