pub struct MessageFormatter;

impl MessageFormatter {
    /// escapes admin-supplied text echoed inside HTML-mode messages
    pub fn escape_html(text: &str) -> String {
        html_escape::encode_text(text).to_string()
    }
}
