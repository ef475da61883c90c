//! Format converters
//!
//! [`BuiltinConverter`] renders Markdown, HTML, JSON and plain text in
//! process. PDF output is delegated to an [`ExternalRenderer`], typically a
//! typesetting tool such as `pandoc`, that reads Markdown on stdin and
//! writes the rendered document to stdout.

use super::traits::FormatConverter;
use crate::domain::{ConversionOptions, Document, ExportError, ExportFormat};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// External command used to render formats Lectern cannot produce itself
#[derive(Debug, Clone)]
pub struct ExternalRenderer {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ExternalRenderer {
    /// Create a renderer invoking `command args...`
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }

    /// Command name
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Pipe `input` through the command and return its stdout
    pub async fn render(&self, format: ExportFormat, input: &[u8]) -> Result<Vec<u8>, ExportError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ExportError::conversion(format, format!("failed to start '{}': {e}", self.command))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExportError::conversion(format, "renderer stdin unavailable"))?;
        let input = input.to_vec();
        let feeder = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ExportError::conversion(
                    format,
                    format!("'{}' failed: {e}", self.command),
                ))
            }
            Err(_) => {
                return Err(ExportError::conversion(
                    format,
                    format!(
                        "'{}' timed out after {}s",
                        self.command,
                        self.timeout.as_secs()
                    ),
                ))
            }
        };

        if let Ok(Err(e)) = feeder.await {
            tracing::debug!(command = %self.command, error = %e, "Renderer closed stdin early");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::conversion(
                format,
                format!(
                    "'{}' exited with {}: {}",
                    self.command,
                    output.status,
                    stderr.trim()
                ),
            ));
        }

        if output.stdout.is_empty() {
            return Err(ExportError::conversion(
                format,
                format!("'{}' produced no output", self.command),
            ));
        }

        Ok(output.stdout)
    }
}

/// In-process converter with optional external PDF rendering
#[derive(Debug, Clone, Default)]
pub struct BuiltinConverter {
    pdf_renderer: Option<ExternalRenderer>,
}

#[derive(Serialize)]
struct JsonSection<'a> {
    session_id: &'a str,
    title: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a serde_json::Map<String, Value>>,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branding: Option<&'a Value>,
    sections: Vec<JsonSection<'a>>,
}

impl BuiltinConverter {
    /// Create a converter without PDF support
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable PDF output through an external renderer
    pub fn with_pdf_renderer(mut self, renderer: ExternalRenderer) -> Self {
        self.pdf_renderer = Some(renderer);
        self
    }

    fn render_markdown(document: &Document, options: &ConversionOptions) -> String {
        if !options.include_metadata {
            return document.to_markdown();
        }

        let sessions: Vec<String> = document
            .session_ids()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut out = String::from("---\n");
        out.push_str(&format!("title: {}\n", document.title));
        out.push_str(&format!("sessions: [{}]\n", sessions.join(", ")));
        if let Some(template) = &options.template_name {
            out.push_str(&format!("template: {template}\n"));
        }
        out.push_str("---\n\n");
        out.push_str(&document.to_markdown());
        out
    }

    fn render_html(document: &Document, options: &ConversionOptions) -> String {
        let body_class = options
            .template_name
            .as_deref()
            .map(|t| format!(" class=\"template-{}\"", escape_html(t)))
            .unwrap_or_default();
        let branding = options.branding_options.as_ref();
        let color = branding
            .and_then(|b| b.get("primary_color"))
            .and_then(Value::as_str);
        let organization = branding
            .and_then(|b| b.get("organization"))
            .and_then(Value::as_str);

        let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", escape_html(&document.title)));
        if let Some(color) = color {
            html.push_str(&format!(
                "<style>:root {{ --primary-color: {}; }}</style>\n",
                escape_html(color)
            ));
        }
        if options.include_metadata {
            for section in &document.sections {
                for (key, value) in &section.metadata {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    html.push_str(&format!(
                        "<meta name=\"{}:{}\" content=\"{}\">\n",
                        escape_html(section.session_id.as_str()),
                        escape_html(key),
                        escape_html(&value)
                    ));
                }
            }
        }
        html.push_str(&format!("</head>\n<body{body_class}>\n"));

        for section in &document.sections {
            html.push_str(&format!(
                "<section data-session=\"{}\">\n<h1>{}</h1>\n",
                escape_html(section.session_id.as_str()),
                escape_html(&section.title)
            ));
            for paragraph in section
                .content
                .split("\n\n")
                .map(str::trim)
                .filter(|p| !p.is_empty())
            {
                html.push_str(&format!("<p>{}</p>\n", escape_html(paragraph)));
            }
            html.push_str("</section>\n");
        }

        if let Some(org) = organization {
            html.push_str(&format!("<footer>{}</footer>\n", escape_html(org)));
        }
        html.push_str("</body>\n</html>\n");
        html
    }

    fn render_json(
        document: &Document,
        options: &ConversionOptions,
    ) -> Result<Vec<u8>, ExportError> {
        let doc = JsonDocument {
            title: &document.title,
            template: options.template_name.as_deref(),
            branding: options.branding_options.as_ref(),
            sections: document
                .sections
                .iter()
                .map(|s| JsonSection {
                    session_id: s.session_id.as_str(),
                    title: &s.title,
                    content: &s.content,
                    metadata: (options.include_metadata && !s.metadata.is_empty())
                        .then_some(&s.metadata),
                })
                .collect(),
        };
        serde_json::to_vec_pretty(&doc)
            .map_err(|e| ExportError::conversion(ExportFormat::Json, e.to_string()))
    }

    fn render_text(document: &Document) -> String {
        let mut out = String::new();
        for (i, section) in document.sections.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&section.title);
            out.push('\n');
            out.push_str(&"=".repeat(section.title.chars().count()));
            out.push_str("\n\n");
            out.push_str(section.content.trim_end());
            out.push('\n');
        }
        out
    }
}

#[async_trait]
impl FormatConverter for BuiltinConverter {
    async fn convert(
        &self,
        document: &Document,
        format: ExportFormat,
        options: &ConversionOptions,
    ) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Markdown => Ok(Self::render_markdown(document, options).into_bytes()),
            ExportFormat::Html => Ok(Self::render_html(document, options).into_bytes()),
            ExportFormat::Json => Self::render_json(document, options),
            ExportFormat::Text => Ok(Self::render_text(document).into_bytes()),
            ExportFormat::Pdf => match &self.pdf_renderer {
                Some(renderer) => {
                    let markdown = Self::render_markdown(document, options);
                    renderer.render(format, markdown.as_bytes()).await
                }
                None => Err(ExportError::conversion(
                    format,
                    "no PDF renderer configured (set converter.pdf_command)",
                )),
            },
        }
    }
}

/// Escape text for inclusion in HTML
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Section, SessionId};
    use serde_json::json;

    fn doc() -> Document {
        let mut meta = serde_json::Map::new();
        meta.insert("week".to_string(), json!(3));
        Document::merge(vec![
            Document::from_section(
                Section::new(SessionId::new("s1").unwrap(), "Intro <Lecture>", "Hello\n\nWorld")
                    .with_metadata(meta),
            ),
            Document::from_section(Section::new(SessionId::new("s2").unwrap(), "Part 2", "More")),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_html_escapes_and_orders_sections() {
        let bytes = BuiltinConverter::new()
            .convert(&doc(), ExportFormat::Html, &ConversionOptions::default())
            .await
            .unwrap();
        let html = String::from_utf8(bytes).unwrap();
        assert!(html.contains("<title>Intro &lt;Lecture&gt;</title>"));
        assert!(html.contains("<p>Hello</p>\n<p>World</p>"));
        let first = html.find("data-session=\"s1\"").unwrap();
        let second = html.find("data-session=\"s2\"").unwrap();
        assert!(first < second);
        assert!(!html.contains("<meta name=\"s1:week\""));
    }

    #[tokio::test]
    async fn test_html_template_branding_metadata() {
        let options = ConversionOptions {
            template_name: Some("lecture".to_string()),
            include_metadata: true,
            branding_options: Some(json!({"primary_color": "#003366", "organization": "Uni"})),
        };
        let bytes = BuiltinConverter::new()
            .convert(&doc(), ExportFormat::Html, &options)
            .await
            .unwrap();
        let html = String::from_utf8(bytes).unwrap();
        assert!(html.contains("<body class=\"template-lecture\">"));
        assert!(html.contains("--primary-color: #003366"));
        assert!(html.contains("<footer>Uni</footer>"));
        assert!(html.contains("<meta name=\"s1:week\" content=\"3\">"));
    }

    #[tokio::test]
    async fn test_json_output_strips_metadata_unless_requested() {
        let converter = BuiltinConverter::new();
        let bytes = converter
            .convert(&doc(), ExportFormat::Json, &ConversionOptions::default())
            .await
            .unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["sections"].as_array().unwrap().len(), 2);
        assert!(value["sections"][0].get("metadata").is_none());

        let options = ConversionOptions {
            include_metadata: true,
            ..Default::default()
        };
        let bytes = converter
            .convert(&doc(), ExportFormat::Json, &options)
            .await
            .unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["sections"][0]["metadata"]["week"], 3);
    }

    #[tokio::test]
    async fn test_markdown_front_matter() {
        let options = ConversionOptions {
            include_metadata: true,
            ..Default::default()
        };
        let bytes = BuiltinConverter::new()
            .convert(&doc(), ExportFormat::Markdown, &options)
            .await
            .unwrap();
        let md = String::from_utf8(bytes).unwrap();
        assert!(md.starts_with("---\ntitle: Intro <Lecture>\nsessions: [s1, s2]\n---\n"));
        assert!(md.contains("# Part 2"));
    }

    #[tokio::test]
    async fn test_text_output() {
        let bytes = BuiltinConverter::new()
            .convert(&doc(), ExportFormat::Text, &ConversionOptions::default())
            .await
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("Intro <Lecture>\n===============\n\nHello"));
    }

    #[tokio::test]
    async fn test_pdf_without_renderer_is_conversion_error() {
        let err = BuiltinConverter::new()
            .convert(&doc(), ExportFormat::Pdf, &ConversionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Conversion { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pdf_via_external_renderer() {
        let renderer = ExternalRenderer::new("cat", Vec::new(), Duration::from_secs(10));
        let bytes = BuiltinConverter::new()
            .with_pdf_renderer(renderer)
            .convert(&doc(), ExportFormat::Pdf, &ConversionOptions::default())
            .await
            .unwrap();
        assert!(String::from_utf8(bytes).unwrap().starts_with("# Intro <Lecture>"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_external_renderer_failure() {
        let renderer = ExternalRenderer::new("false", Vec::new(), Duration::from_secs(10));
        let err = renderer.render(ExportFormat::Pdf, b"x").await.unwrap_err();
        assert!(matches!(err, ExportError::Conversion { .. }));
    }

    #[tokio::test]
    async fn test_external_renderer_missing_command() {
        let renderer = ExternalRenderer::new(
            "lectern-no-such-renderer",
            Vec::new(),
            Duration::from_secs(5),
        );
        let err = renderer.render(ExportFormat::Pdf, b"x").await.unwrap_err();
        assert!(err.to_string().contains("failed to start"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&#39;");
    }
}
