use colored::Colorize;
use serde_json::Value;
use std::io::{IsTerminal, Write};
use std::path::Path;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Human,
    Json,
}

/// Determine the output format based on the user's choice and terminal detection.
pub fn resolve_format(format: Option<Format>) -> Format {
    match format {
        Some(f) => f,
        None => {
            if std::io::stdout().is_terminal() {
                Format::Human
            } else {
                Format::Json
            }
        }
    }
}

/// Print a response body. JSON mode passes the bytes through untouched;
/// human mode re-renders JSON bodies with syntax colors. Bodies that aren't
/// JSON are printed verbatim either way.
pub fn print_body(body: &[u8], format: Format) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_body_to(&mut out, body, format)
}

fn write_body_to(out: &mut impl Write, body: &[u8], format: Format) -> std::io::Result<()> {
    if format == Format::Human {
        if let Ok(value) = serde_json::from_slice::<Value>(body) {
            let mut rendered = String::new();
            render_colored(&value, 0, &mut rendered);
            writeln!(out, "{}", rendered)?;
            return out.flush();
        }
    }
    out.write_all(body)?;
    if !body.ends_with(b"\n") {
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// `HTTP/1.1 <status>` followed by one `name: value` line per header and a blank line.
pub fn print_response_head(status: u16, headers: &[(String, String)]) {
    print!("{}", format_response_head(status, headers));
}

fn format_response_head(status: u16, headers: &[(String, String)]) -> String {
    let mut out = format!("HTTP/1.1 {}\n", status);
    for (name, value) in headers {
        out.push_str(&format!("{}: {}\n", name, value));
    }
    out.push('\n');
    out
}

/// Write a response body to `path`, creating parent directories and
/// truncating any existing file.
pub async fn write_body(path: &Path, body: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", parent.display(), e))?;
    }
    tokio::fs::write(path, body)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))
}

fn render_colored(value: &Value, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    match value {
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push_str("{\n");
            for (i, (key, item)) in map.iter().enumerate() {
                let key = Value::String(key.clone()).to_string();
                out.push_str(&format!("{}  {}: ", pad, key.blue()));
                render_colored(item, indent + 1, out);
                if i + 1 < map.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&pad);
            out.push('}');
        }
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                out.push_str(&pad);
                out.push_str("  ");
                render_colored(item, indent + 1, out);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&pad);
            out.push(']');
        }
        Value::String(_) => out.push_str(&value.to_string().green().to_string()),
        Value::Number(_) => out.push_str(&value.to_string().yellow().to_string()),
        Value::Bool(_) | Value::Null => out.push_str(&value.to_string().magenta().to_string()),
    }
}
