use std::fmt;

use serde::Serialize;

/// A fragment of already-rendered HTML.
///
/// Plain `String`s are text that still needs entity escaping; an `Html` is
/// inserted verbatim. Keeping the two apart is what guarantees every text
/// run is escaped exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Html(String);

impl Html {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Escapes plain text into HTML.
    pub fn escape(text: &str) -> Self {
        Self(escape(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push_html(&mut self, other: &Html) {
        self.0.push_str(&other.0);
    }

    pub fn push_text(&mut self, text: &str) {
        self.0.push_str(&escape(text));
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Html {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Html {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Entity-escapes `&`, `<`, `>`, `"` and `'`.
pub fn escape(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}

/// Decodes HTML entities back into text.
pub fn unescape(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_quotes() {
        assert_eq!(escape(r#"a < b & "c" 'd'"#), "a &lt; b &amp; &quot;c&quot; &#x27;d&#x27;");
    }

    #[test]
    fn unescape_reverses_escape() {
        let text = r#"<a href="x">&</a>"#;
        assert_eq!(unescape(&escape(text)), text);
    }

    #[test]
    fn push_text_escapes_but_push_html_does_not() {
        let mut html = Html::default();
        html.push_text("<b>");
        html.push_html(&Html::from("<b>"));
        assert_eq!(html.as_str(), "&lt;b&gt;<b>");
    }
}
