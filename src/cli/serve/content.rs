//! Reload client injection into served HTML.

/// Inject `script` before the last `</body>`, or append it when the
/// document has none.
pub fn inject_reload_script(content: &[u8], script: &str) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script.as_bytes());
    result.extend_from_slice(&content[pos..]);
    result
}

/// Inject only into HTML responses.
pub fn maybe_inject(body: Vec<u8>, content_type: &str, script: &str) -> Vec<u8> {
    if crate::utils::mime::is_html(content_type) {
        inject_reload_script(&body, script)
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mime::types;

    #[test]
    fn test_inject_before_last_body() {
        let html = b"<html><body><pre></body></pre></BODY></html>";
        let out = inject_reload_script(html, "<script></script>");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<html><body><pre></body></pre><script></script></BODY></html>"
        );
    }

    #[test]
    fn test_append_without_body() {
        let out = inject_reload_script(b"<p>fragment</p>", "<script></script>");
        assert_eq!(String::from_utf8(out).unwrap(), "<p>fragment</p><script></script>");
    }

    #[test]
    fn test_non_html_untouched() {
        let css = b"body{}".to_vec();
        assert_eq!(maybe_inject(css.clone(), types::CSS, "<script>"), css);
    }
}
