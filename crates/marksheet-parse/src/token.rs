use scraper::{Html, Selector};

/// Name of the hidden form field carrying the portal's anti-forgery token.
pub const TOKEN_FIELD: &str = "Token";

/// Pull the anti-forgery token out of a semester index page.
///
/// Returns an empty string when the field is missing, so a session opened
/// against an unexpected page stays usable and the portal decides what to do
/// with the submission.
pub fn extract_token(html: &str) -> String {
    let document = Html::parse_document(html);
    let input_sel = Selector::parse(r#"input[name="Token"]"#).expect("valid selector");

    document
        .select(&input_sel)
        .find_map(|input| input.value().attr("value"))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token() {
        let html = r#"
        <html><body>
        <form action="resultpage.php" method="post">
          <input type="hidden" name="Token" value="a1b2c3d4e5">
          <input type="text" name="lns">
          <input type="text" name="captchacode">
        </form>
        </body></html>
        "#;
        assert_eq!(extract_token(html), "a1b2c3d4e5");
    }

    #[test]
    fn test_missing_token_is_empty() {
        let html = r#"<html><body><form><input name="lns"></form></body></html>"#;
        assert_eq!(extract_token(html), "");
        assert_eq!(extract_token(""), "");
    }

    #[test]
    fn test_token_without_value_is_empty() {
        let html = r#"<form><input type="hidden" name="Token"></form>"#;
        assert_eq!(extract_token(html), "");
    }
}
