//! Dashboard rendering.
//!
//! Turns the selected backend's URL into an HTML page. The template file is
//! re-read on every request so edits show up without a restart.
//!
//! Templates may name the URL as `{{server_url}}` or `{{.ServerURL}}`; an
//! existing `dashboard.html` written for the latter renders unchanged.

use std::borrow::Cow;
use std::path::PathBuf;

use thiserror::Error;

/// Replaced by the HTML-escaped backend URL.
pub const PLACEHOLDER: &str = "{{server_url}}";

/// Accepted alias for [`PLACEHOLDER`].
pub const PLACEHOLDER_ALIAS: &str = "{{.ServerURL}}";

/// Page used when no template file is configured.
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Load Balancer</title>
</head>
<body>
  <h1>Request routed</h1>
  <p>Selected server: <code>{{server_url}}</code></p>
</body>
</html>
"#;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read template {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    template_path: Option<PathBuf>,
}

impl Dashboard {
    pub fn new(template_path: Option<PathBuf>) -> Self {
        Self { template_path }
    }

    /// Render the page for `server_url`.
    pub async fn render(&self, server_url: &str) -> Result<String, RenderError> {
        let template: Cow<'_, str> = match &self.template_path {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .map(Cow::Owned)
                .map_err(|source| RenderError::Read {
                    path: path.clone(),
                    source,
                })?,
            None => Cow::Borrowed(DEFAULT_TEMPLATE),
        };

        Ok(fill(&template, server_url))
    }
}

/// Substitute every placeholder in `template`.
pub fn fill(template: &str, server_url: &str) -> String {
    let escaped = escape_html(server_url);
    template
        .replace(PLACEHOLDER, &escaped)
        .replace(PLACEHOLDER_ALIAS, &escaped)
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
