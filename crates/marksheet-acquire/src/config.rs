use marksheet_model::SemesterKey;
use std::time::Duration;

pub const DEFAULT_PORTAL_URL: &str = "https://results.vtu.ac.in";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

const CAPTCHA_PATH: &str = "captcha/vtu_captcha.php";

/// Where the portal lives and how requests to it are made.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Scheme and host of the portal, without a trailing slash.
    pub base_url: String,
    /// Upper bound on any single outbound request.
    pub timeout: Duration,
    pub user_agent: String,
    /// Skip certificate-chain validation. The portal serves an incomplete
    /// chain, so this is on by default.
    pub accept_incomplete_chain: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PORTAL_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/131.0.0.0 Safari/537.36"
                .to_string(),
            accept_incomplete_chain: true,
        }
    }
}

impl PortalConfig {
    /// Default configuration pointed at a different portal host.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Portal landing page, sent as the referer when opening a semester.
    pub fn home_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    /// Index page: sets the session cookies and embeds the token.
    pub fn index_url(&self, semester: SemesterKey) -> String {
        format!("{}/{}/index.php", self.base_url, semester.portal_slug())
    }

    pub fn result_url(&self, semester: SemesterKey) -> String {
        format!("{}/{}/resultpage.php", self.base_url, semester.portal_slug())
    }

    /// The CAPTCHA endpoint is shared by all semesters; the cookie jar decides
    /// which challenge is served.
    pub fn captcha_url(&self) -> String {
        format!("{}/{CAPTCHA_PATH}", self.base_url)
    }
}
