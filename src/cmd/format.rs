/*!
format.rs

Human-output formatting for the `dtq` CLI.

Provides consistent color / boxed / tabular primitives and centralizes the
style decision logic (NO_COLOR / NO_EMOJI env vars, COLUMNS width). JSON
output paths must not use these helpers, so machine output stays clean.

Public API:
  - StyleOptions::detect()
  - color(role, text, &StyleOptions)
  - emoji(tag, &StyleOptions)
  - box_header(title, subtitle_opt, &StyleOptions)
  - table(headers, rows, TableOpts, &StyleOptions)
  - result_table(&normalize::Table, &StyleOptions)

Kept dependency-free on purpose.
*/

use std::borrow::Cow;

use crate::query::normalize;

/* ---- Style Options ---- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        let use_color = std::env::var_os("NO_COLOR").is_none();
        let use_emoji = std::env::var_os("NO_EMOJI").is_none();

        let term_width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);

        StyleOptions {
            use_color,
            use_emoji,
            term_width,
        }
    }
}

/* ---- Color / Emoji ---- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Success,
    Warning,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",    // cyan-ish
        Role::Secondary => "38;5;250", // gray
        Role::Accent => "38;5;213",    // magenta/pink
        Role::Success => "38;5;82",    // green
        Role::Warning => "38;5;214",   // orange
        Role::Error => "38;5;196",     // red
        Role::Dim => "2",              // faint
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔",
        "error" => "✖",
        "warn" => "⚠",
        "info" => "ℹ",
        "list" => "📜",
        "search" => "🔍",
        _ => "",
    }
}

/* ---- Box Header ---- */

pub fn box_header(
    title: impl AsRef<str>,
    subtitle: Option<impl AsRef<str>>,
    style: &StyleOptions,
) -> String {
    let title_styled = color(Role::Primary, title.as_ref(), style);
    let inner = match subtitle {
        Some(sub) => format!(
            "{title_styled}  {}",
            color(Role::Secondary, sub.as_ref(), style)
        ),
        None => title_styled,
    };

    let inner_len = display_width(&inner);
    let max_inner = style.term_width.max(20) - 4;
    let wrapped = wrap_text(&inner, max_inner.min(inner_len.max(1)));
    let content_width = wrapped.iter().map(|l| display_width(l)).max().unwrap_or(0);

    let mut lines = Vec::with_capacity(wrapped.len() + 2);
    lines.push(format!("┌{}┐", "─".repeat(content_width + 2)));
    for line in wrapped {
        let pad = content_width - display_width(&line);
        lines.push(format!("│ {line}{} │", " ".repeat(pad)));
    }
    lines.push(format!("└{}┘", "─".repeat(content_width + 2)));
    lines.join("\n")
}

/* ---- Table Rendering ---- */

#[derive(Debug, Clone)]
pub struct TableOpts {
    pub max_width: usize, // 0 -> style.term_width
    pub truncate: bool,
    pub header_sep: bool,
    pub min_col_width: usize,
}

impl Default for TableOpts {
    fn default() -> Self {
        Self {
            max_width: 0,
            truncate: true,
            header_sep: true,
            min_col_width: 2,
        }
    }
}

pub fn table(
    headers: &[&str],
    rows: &[Vec<String>],
    opts: TableOpts,
    style: &StyleOptions,
) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let col_count = headers.len();
    let width_limit = if opts.max_width == 0 {
        style.term_width
    } else {
        opts.max_width.min(style.term_width)
    };

    // Column widths: max content width, then greedily shrink the widest
    // columns to fit the terminal.
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    let total: usize = widths.iter().sum::<usize>() + (col_count - 1) * 2;
    if total > width_limit {
        let mut overflow = total - width_limit;
        let mut ordered: Vec<(usize, usize)> = widths.iter().copied().enumerate().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));
        for (idx, _) in ordered {
            if overflow == 0 {
                break;
            }
            if widths[idx] > opts.min_col_width {
                let shrink = (widths[idx] - opts.min_col_width).min(overflow);
                widths[idx] -= shrink;
                overflow -= shrink;
            }
        }
    }

    let mut out = String::new();
    for (i, h) in headers.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(&color(
            Role::Accent,
            pad_or_truncate(h, widths[i], opts.truncate),
            style,
        ));
    }
    out.push('\n');

    if opts.header_sep {
        let mut sep = String::new();
        for (i, _) in headers.iter().enumerate() {
            if i > 0 {
                sep.push_str("  ");
            }
            sep.push_str(&"-".repeat(widths[i]));
        }
        out.push_str(&color(Role::Dim, sep, style));
        out.push('\n');
    }

    for (r_idx, row) in rows.iter().enumerate() {
        for c in 0..col_count {
            if c > 0 {
                out.push_str("  ");
            }
            let raw = row.get(c).map(|s| s.as_str()).unwrap_or("");
            out.push_str(&pad_or_truncate(raw, widths[c], opts.truncate));
        }
        if r_idx + 1 < rows.len() {
            out.push('\n');
        }
    }

    out
}

/// Render a normalized result table; absent cells display as `-`.
pub fn result_table(result: &normalize::Table, style: &StyleOptions) -> String {
    let headers: Vec<&str> = result.columns.iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.clone().unwrap_or_else(|| "-".to_string()))
                .collect()
        })
        .collect();
    table(
        &headers,
        &rows,
        TableOpts {
            max_width: style.term_width,
            ..Default::default()
        },
        style,
    )
}

fn pad_or_truncate(s: &str, width: usize, truncate: bool) -> String {
    let len = display_width(s);
    if len == width {
        return s.to_string();
    }
    if len < width {
        return format!("{s}{}", " ".repeat(width - len));
    }
    if !truncate {
        return s.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }
    let mut out = String::new();
    for ch in s.chars() {
        if display_width(&out) + 1 >= width {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    let final_len = display_width(&out);
    if final_len < width {
        out.push_str(&" ".repeat(width - final_len));
    }
    out
}

/* ---- Text / ANSI Helpers ---- */

pub fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![s.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in s.split_whitespace() {
        if !current.is_empty() && display_width(&current) + word.len() + 1 > max_width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn strip_ansi(s: &str) -> Cow<'_, str> {
    // Minimal CSI scan, no regex.
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for t in chars.by_ref() {
                if t.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(c);
    }
    Cow::Owned(buf)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/* ---- Tests ---- */
