use marksheet_model::{SemesterKey, VisitorId};

use crate::error::PortalError;
use crate::session::SessionRegistry;

pub const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// A CAPTCHA image as served by the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl CaptchaImage {
    /// Headers to send along with a relayed image. The relay URL never
    /// changes between challenges, so nothing may cache it.
    pub const NO_CACHE_HEADERS: [(&'static str, &'static str); 3] = [
        ("Cache-Control", "no-store, no-cache, must-revalidate, max-age=0"),
        ("Pragma", "no-cache"),
        ("Expires", "0"),
    ];

    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        let content_type = content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        Self {
            bytes,
            content_type,
        }
    }

    /// File extension matching the content type.
    pub fn extension(&self) -> &'static str {
        let mime = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            _ => "png",
        }
    }
}

/// Parse a semester named by a visitor request. Unknown keys are reported as
/// an expired session.
pub fn parse_semester(key: &str) -> Result<SemesterKey, PortalError> {
    key.parse::<SemesterKey>().map_err(PortalError::from)
}

/// Current CAPTCHA for a semester, through the visitor's existing session.
pub async fn get(
    registry: &SessionRegistry,
    visitor: &VisitorId,
    semester: SemesterKey,
) -> Result<CaptchaImage, PortalError> {
    let session = registry.session(visitor, semester)?;
    tracing::info!(visitor = %visitor, semester = %semester, "Relaying CAPTCHA");
    session.fetch_captcha().await
}

/// Fresh CAPTCHA for a semester: the session is re-opened first so the
/// portal issues a new challenge instead of one tied to the old cookies.
pub async fn refresh(
    registry: &SessionRegistry,
    visitor: &VisitorId,
    semester: SemesterKey,
) -> Result<CaptchaImage, PortalError> {
    let session = registry.refresh(visitor, semester).await?;
    tracing::info!(visitor = %visitor, semester = %semester, "Relaying refreshed CAPTCHA");
    session.fetch_captcha().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_content_type_defaults_to_png() {
        let image = CaptchaImage::new(vec![1, 2, 3], None);
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.extension(), "png");

        let blank = CaptchaImage::new(Vec::new(), Some("  ".into()));
        assert_eq!(blank.content_type, "image/png");
    }

    #[test]
    fn test_content_type_kept_verbatim() {
        let image = CaptchaImage::new(vec![0xff, 0xd8], Some("image/jpeg; charset=binary".into()));
        assert_eq!(image.content_type, "image/jpeg; charset=binary");
        assert_eq!(image.extension(), "jpg");
    }

    #[test]
    fn test_no_cache_headers() {
        let names: Vec<&str> = CaptchaImage::NO_CACHE_HEADERS.iter().map(|(n, _)| *n).collect();
        assert!(names.contains(&"Cache-Control"));
        assert!(CaptchaImage::NO_CACHE_HEADERS[0].1.contains("no-store"));
    }

    #[test]
    fn test_parse_semester_rejects_unknown() {
        assert_eq!(parse_semester("sem2").unwrap(), SemesterKey::Sem2);
        let err = parse_semester("sem9").unwrap_err();
        assert!(err.is_session_expired());
    }
}
