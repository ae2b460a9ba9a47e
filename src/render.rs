use std::collections::HashMap;
use std::fmt::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::admin::{AdminPanel, ADMIN_PANEL_FIELD};
use crate::charts::ChartSpec;
use crate::error::DashboardError;
use crate::models::Table;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Success,
    Error,
}

/// Page rendering collaborator; the dashboard shell only talks to this.
pub trait Renderer {
    fn render_title(&mut self, text: &str);
    fn render_subheader(&mut self, text: &str);
    fn render_table(&mut self, table: &Table);
    fn render_image(&mut self, source: &ImageSource, width: u32);
    fn render_chart(&mut self, spec: &ChartSpec) -> Result<(), DashboardError>;
    /// Returns true when the viewer triggered this button on the current pass.
    fn render_button(&mut self, label: &str) -> bool;
    fn render_password_field(&mut self, label: &str) -> String;
    fn render_file_upload(&mut self, label: &str, allowed_types: &[&str]) -> Option<Vec<u8>>;
    fn render_message(&mut self, level: MessageLevel, text: &str);
}

/// Form name used for a labelled control.
pub fn control_name(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Values submitted with the previous pass, keyed by control name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, Vec<u8>>,
}

impl FormInput {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn admin_panel(&self) -> AdminPanel {
        AdminPanel::from_form(self.field(ADMIN_PANEL_FIELD))
    }
}

/// MIME type for an uploaded header image, from its leading bytes.
pub fn image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Turns a render pass into one HTML document whose controls post back as a
/// single multipart form.
pub struct HtmlRenderer {
    input: FormInput,
    body: String,
    charts: usize,
}

impl HtmlRenderer {
    pub fn new(input: FormInput) -> Self {
        Self {
            input,
            body: String::new(),
            charts: 0,
        }
    }

    /// Closes the pass, carrying the admin panel state into the next submit.
    pub fn finish(self, panel: AdminPanel) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "<!DOCTYPE html>");
        let _ = writeln!(output, "<html lang=\"en\">");
        let _ = writeln!(output, "<head>");
        let _ = writeln!(output, "<meta charset=\"utf-8\">");
        let _ = writeln!(output, "<title>User Sign Up and Challenge Dashboard</title>");
        for script in ["vega@5", "vega-lite@5", "vega-embed@6"] {
            let _ = writeln!(
                output,
                "<script src=\"https://cdn.jsdelivr.net/npm/{script}\"></script>"
            );
        }
        let _ = writeln!(output, "</head>");
        let _ = writeln!(output, "<body>");
        let _ = writeln!(
            output,
            "<form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">"
        );
        output.push_str(&self.body);
        let _ = writeln!(
            output,
            "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
            ADMIN_PANEL_FIELD,
            panel.as_str()
        );
        let _ = writeln!(output, "</form>");
        let _ = writeln!(output, "</body>");
        let _ = writeln!(output, "</html>");
        output
    }
}

impl Renderer for HtmlRenderer {
    fn render_title(&mut self, text: &str) {
        let _ = writeln!(self.body, "<h1>{}</h1>", escape_html(text));
    }

    fn render_subheader(&mut self, text: &str) {
        let _ = writeln!(self.body, "<h2>{}</h2>", escape_html(text));
    }

    fn render_table(&mut self, table: &Table) {
        let _ = writeln!(self.body, "<table>");
        let _ = write!(self.body, "<thead><tr>");
        for column in &table.columns {
            let _ = write!(self.body, "<th>{}</th>", escape_html(column));
        }
        let _ = writeln!(self.body, "</tr></thead>");
        let _ = writeln!(self.body, "<tbody>");
        for row in &table.rows {
            let _ = write!(self.body, "<tr>");
            for cell in row {
                let _ = write!(self.body, "<td>{}</td>", escape_html(cell));
            }
            let _ = writeln!(self.body, "</tr>");
        }
        let _ = writeln!(self.body, "</tbody>");
        let _ = writeln!(self.body, "</table>");
    }

    fn render_image(&mut self, source: &ImageSource, width: u32) {
        let src = match source {
            ImageSource::Url(url) => escape_html(url),
            ImageSource::Bytes(bytes) => {
                format!("data:{};base64,{}", image_mime(bytes), STANDARD.encode(bytes))
            }
        };
        let _ = writeln!(
            self.body,
            "<img src=\"{src}\" width=\"{width}\" alt=\"Header image\">"
        );
    }

    fn render_chart(&mut self, spec: &ChartSpec) -> Result<(), DashboardError> {
        // "</" inside an inline script would end the element early.
        let json = serde_json::to_string(spec)?.replace("</", "<\\/");
        let id = format!("chart-{}", self.charts);
        self.charts += 1;
        let _ = writeln!(self.body, "<div id=\"{id}\"></div>");
        let _ = writeln!(self.body, "<script>vegaEmbed(\"#{id}\", {json});</script>");
        Ok(())
    }

    fn render_button(&mut self, label: &str) -> bool {
        let name = control_name(label);
        let _ = writeln!(
            self.body,
            "<button type=\"submit\" name=\"{name}\" value=\"1\">{}</button>",
            escape_html(label)
        );
        self.input.fields.contains_key(&name)
    }

    fn render_password_field(&mut self, label: &str) -> String {
        let name = control_name(label);
        let value = self.input.field(&name).unwrap_or_default().to_string();
        let _ = writeln!(
            self.body,
            "<label>{} <input type=\"password\" name=\"{name}\" value=\"{}\"></label>",
            escape_html(label),
            escape_html(&value)
        );
        value
    }

    fn render_file_upload(&mut self, label: &str, allowed_types: &[&str]) -> Option<Vec<u8>> {
        let name = control_name(label);
        let accept = allowed_types
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(
            self.body,
            "<label>{} <input type=\"file\" name=\"{name}\" accept=\"{accept}\"></label>",
            escape_html(label)
        );
        self.input.files.get(&name).filter(|bytes| !bytes.is_empty()).cloned()
    }

    fn render_message(&mut self, level: MessageLevel, text: &str) {
        let class = match level {
            MessageLevel::Success => "success",
            MessageLevel::Error => "error",
        };
        let _ = writeln!(self.body, "<p class=\"{class}\">{}</p>", escape_html(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_names_are_form_safe() {
        assert_eq!(control_name("Admin Password"), "admin_password");
        assert_eq!(control_name("Update Header Image"), "update_header_image");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"O'Neil\" & co</b>"),
            "&lt;b&gt;&quot;O&#39;Neil&quot; &amp; co&lt;/b&gt;"
        );
    }

    #[test]
    fn buttons_report_submitted_presses_only() {
        let mut input = FormInput::default();
        input.fields.insert("admin".to_string(), "1".to_string());
        let mut renderer = HtmlRenderer::new(input);

        assert!(renderer.render_button("Admin"));
        assert!(!renderer.render_button("Update Header Image"));
    }

    #[test]
    fn sniffs_png_and_jpeg_uploads() {
        assert_eq!(image_mime(b"\x89PNG\r\n\x1a\n\0\0"), "image/png");
        assert_eq!(image_mime(&[0xff, 0xd8, 0xff, 0xe0, 0x00]), "image/jpeg");
        assert_eq!(image_mime(b"GIF89a"), "application/octet-stream");
    }

    #[test]
    fn empty_uploads_count_as_missing() {
        let mut input = FormInput::default();
        input.files.insert("upload".to_string(), Vec::new());
        let mut renderer = HtmlRenderer::new(input);
        assert_eq!(renderer.render_file_upload("Upload", &["png"]), None);
    }

    #[test]
    fn finished_page_carries_panel_state_and_content() {
        let mut renderer = HtmlRenderer::new(FormInput::default());
        renderer.render_title("Dash & Board");
        renderer.render_image(&ImageSource::Bytes(vec![0xff, 0xd8, 0xff]), 200);
        renderer.render_table(&Table {
            columns: vec!["Email".to_string()],
            rows: vec![vec!["a@example.com".to_string()]],
        });
        let html = renderer.finish(AdminPanel::Visible);

        assert!(html.contains("<h1>Dash &amp; Board</h1>"));
        assert!(html.contains("data:image/jpeg;base64,/9j/"));
        assert!(html.contains("<td>a@example.com</td>"));
        assert!(html.contains("name=\"admin_panel\" value=\"visible\""));
    }
}
