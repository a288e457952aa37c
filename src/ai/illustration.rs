//! Locally rendered SVG stand-in used when diagram generation fails.

use base64::Engine;

use super::parse::extract_labels;
use super::Illustration;

const WIDTH: u32 = 640;
const LINE_CHARS: usize = 48;
const MAX_LINES: usize = 10;

/// Render `description` as a simple captioned SVG card.
pub fn placeholder(description: &str) -> Illustration {
    let labels = extract_labels(description);
    let svg = render_svg(description, &labels);
    Illustration {
        mime_type: "image/svg+xml".into(),
        data: base64::engine::general_purpose::STANDARD.encode(svg.as_bytes()),
        description: description.to_string(),
        labels,
        is_placeholder: true,
    }
}

fn render_svg(description: &str, labels: &[String]) -> String {
    let lines = wrap(description, LINE_CHARS, MAX_LINES);
    let label_rows = labels.len().div_ceil(3);
    let height = 120 + lines.len() as u32 * 26 + label_rows as u32 * 40;

    let mut svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}">"##
    );
    svg.push_str(&format!(
        r##"<rect x="8" y="8" width="{}" height="{}" rx="16" fill="#f5f3ff" stroke="#7c3aed" stroke-width="3"/>"##,
        WIDTH - 16,
        height - 16
    ));
    svg.push_str(
        r##"<text x="32" y="56" font-family="sans-serif" font-size="24" font-weight="bold" fill="#5b21b6">Diagram</text>"##,
    );

    let mut y = 96;
    for line in &lines {
        svg.push_str(&format!(
            r##"<text x="32" y="{y}" font-family="sans-serif" font-size="18" fill="#1f2937">{}</text>"##,
            escape_xml(line)
        ));
        y += 26;
    }

    y += 12;
    for (i, label) in labels.iter().enumerate() {
        let col = (i % 3) as u32;
        let row_y = y + (i / 3) as u32 * 40;
        let x = 32 + col * 196;
        svg.push_str(&format!(
            r##"<rect x="{x}" y="{row_y}" width="184" height="30" rx="8" fill="#ede9fe"/><text x="{}" y="{}" font-family="sans-serif" font-size="15" fill="#4c1d95">{}</text>"##,
            x + 10,
            row_y + 20,
            escape_xml(&truncate_chars(label, 20))
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Greedy word wrap. Overflowing text is cut with an ellipsis on the last line.
fn wrap(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut truncated = false;

    for word in text.split_whitespace() {
        let word = truncate_chars(word, width);
        let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            if lines.len() == max_lines {
                truncated = true;
                break;
            }
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !truncated && !current.is_empty() {
        lines.push(current);
    }
    if truncated {
        if let Some(last) = lines.last_mut() {
            last.push('…');
        }
    }
    lines
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
