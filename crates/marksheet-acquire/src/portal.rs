use marksheet_model::SemesterKey;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::sync::Arc;

use crate::captcha::CaptchaImage;
use crate::config::PortalConfig;
use crate::error::PortalError;

/// A browser-like session against one semester sub-site.
///
/// Owns its own cookie jar, so the portal sees each semester of each visitor
/// as a separate browser. The anti-forgery token captured from the index page
/// is replayed on submission.
pub struct PortalSession {
    semester: SemesterKey,
    client: reqwest::Client,
    jar: Arc<Jar>,
    token: String,
    index_url: String,
    result_url: String,
    captcha_url: String,
}

impl PortalSession {
    /// Open a session: fetch the semester index page, keep its cookies, and
    /// capture the hidden token.
    ///
    /// Network failures are logged and swallowed. The session is still
    /// returned, with no cookies and an empty token, and the portal's
    /// eventual response to a submission decides the outcome.
    pub async fn open(config: &PortalConfig, semester: SemesterKey) -> Result<Self, PortalError> {
        let jar = Arc::new(Jar::default());
        let client = build_client(config, jar.clone())?;

        let mut session = Self {
            semester,
            client,
            jar,
            token: String::new(),
            index_url: config.index_url(semester),
            result_url: config.result_url(semester),
            captcha_url: config.captcha_url(),
        };

        match session.fetch_index(&config.home_url()).await {
            Ok(html) => {
                session.token = marksheet_parse::extract_token(&html);
                if session.token.is_empty() {
                    tracing::warn!(semester = %semester, "Index page has no anti-forgery token");
                }
                tracing::debug!(
                    semester = %semester,
                    bytes = html.len(),
                    cookies = session.has_cookies(),
                    "Opened portal session"
                );
            }
            Err(e) => {
                tracing::warn!(semester = %semester, error = %e, "Could not open portal session, continuing without cookies");
            }
        }

        Ok(session)
    }

    pub fn semester(&self) -> SemesterKey {
        self.semester
    }

    /// Anti-forgery token from the index page; empty if none was found.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    /// Whether the portal has set any cookie for this semester's sub-site.
    pub fn has_cookies(&self) -> bool {
        reqwest::Url::parse(&self.index_url)
            .ok()
            .and_then(|url| self.jar.cookies(&url))
            .is_some()
    }

    async fn fetch_index(&self, referer: &str) -> Result<String, PortalError> {
        let response = self
            .client
            .get(&self.index_url)
            .header(header::REFERER, referer)
            .send()
            .await
            .map_err(|e| PortalError::transport(&self.index_url, e))?;

        response
            .text()
            .await
            .map_err(|e| PortalError::transport(&self.index_url, e))
    }

    /// Fetch the CAPTCHA image bound to this session's cookies.
    ///
    /// A timestamp query parameter defeats intermediate caches. Body and
    /// content type are returned as the portal sent them.
    pub async fn fetch_captcha(&self) -> Result<CaptchaImage, PortalError> {
        let cache_buster = chrono::Utc::now().timestamp_millis().to_string();

        let response = self
            .client
            .get(&self.captcha_url)
            .query(&[("_CAPTCHA", ""), ("t", cache_buster.as_str())])
            .header(header::REFERER, &self.index_url)
            .send()
            .await
            .map_err(|e| PortalError::transport(&self.captcha_url, e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PortalError::transport(&self.captcha_url, e))?;

        tracing::debug!(
            semester = %self.semester,
            status = status.as_u16(),
            bytes = bytes.len(),
            "Fetched CAPTCHA"
        );

        Ok(CaptchaImage::new(bytes.to_vec(), content_type))
    }

    /// Post the lookup form and return the raw response page.
    pub async fn submit(&self, usn: &str, captcha: &str) -> Result<String, PortalError> {
        let form = [
            ("Token", self.token.as_str()),
            ("lns", usn),
            ("captchacode", captcha),
        ];

        let response = self
            .client
            .post(&self.result_url)
            .header(header::REFERER, &self.index_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| PortalError::transport(&self.result_url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortalError::transport(&self.result_url, e))?;

        tracing::debug!(
            semester = %self.semester,
            status = status.as_u16(),
            bytes = body.len(),
            "Received result page"
        );

        Ok(body)
    }
}

impl std::fmt::Debug for PortalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalSession")
            .field("semester", &self.semester)
            .field("index_url", &self.index_url)
            .field("has_token", &!self.token.is_empty())
            .finish_non_exhaustive()
    }
}

fn build_client(config: &PortalConfig, jar: Arc<Jar>) -> Result<reqwest::Client, PortalError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );

    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .cookie_provider(jar)
        .timeout(config.timeout)
        .danger_accept_invalid_certs(config.accept_incomplete_chain)
        .build()
        .map_err(|e| PortalError::InvalidConfig(format!("could not build HTTP client: {e}")))
}
