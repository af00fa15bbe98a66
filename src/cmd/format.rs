/*!
format.rs

Human-readable output helpers for the operator commands (`list`, `get`, `call`).

  - StyleOptions::detect()  NO_COLOR / COLUMNS aware
  - color(role, text, &style)
  - header(title, subtitle, &style)  one framed title line
  - table(headers, rows, &style)     column-aligned, widest columns shrink first

JSON output paths never go through this module.
*/

use std::borrow::Cow;

use crate::utils::truncate_chars;

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub term_width: usize,
}

impl StyleOptions {
    pub fn detect() -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);
        Self {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            term_width: width,
        }
    }

    #[cfg(test)]
    pub fn plain(term_width: usize) -> Self {
        Self {
            use_color: false,
            term_width,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Success,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Secondary => "38;5;250",
        Role::Accent => "38;5;213",
        Role::Success => "38;5;82",
        Role::Error => "38;5;196",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/// `┌─┐ │ title  subtitle │ └─┘`, clipped to the terminal width.
pub fn header(title: &str, subtitle: Option<&str>, style: &StyleOptions) -> String {
    let plain = match subtitle {
        Some(sub) => format!("{title}  {sub}"),
        None => title.to_string(),
    };
    let max_inner = style.term_width.saturating_sub(4).max(10);
    let plain = truncate_chars(&plain, max_inner);
    let inner_width = plain.chars().count();

    let styled = if subtitle.is_some() && plain.len() > title.len() && plain.starts_with(title) {
        format!(
            "{}{}",
            color(Role::Primary, title, style),
            color(Role::Secondary, &plain[title.len()..], style)
        )
    } else {
        color(Role::Primary, &plain, style)
    };

    let rule = "─".repeat(inner_width + 2);
    format!("┌{rule}┐\n│ {styled} │\n└{rule}┘")
}

pub fn table(headers: &[&str], rows: &[Vec<String>], style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    let gaps = (cols - 1) * 2;
    let total: usize = widths.iter().sum::<usize>() + gaps;
    if total > style.term_width {
        let mut overflow = total - style.term_width;
        let mut order: Vec<usize> = (0..cols).collect();
        order.sort_by(|a, b| widths[*b].cmp(&widths[*a]));
        for idx in order {
            if overflow == 0 {
                break;
            }
            let shrink = widths[idx].saturating_sub(4).min(overflow);
            widths[idx] -= shrink;
            overflow -= shrink;
        }
    }

    let mut out = color(Role::Accent, render_row(headers.iter().copied(), &widths), style);
    out.push('\n');
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&color(Role::Dim, sep.join("  "), style));
    for row in rows {
        out.push('\n');
        let cells = row.iter().map(String::as_str).chain(std::iter::repeat(""));
        out.push_str(&render_row(cells, &widths));
    }
    out
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::new();
    for (i, (cell, width)) in cells.zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(&fit(cell, *width));
    }
    line.trim_end().to_string()
}

/// Pad or clip `s` to exactly `width` visible characters.
fn fit(s: &str, width: usize) -> String {
    let plain = strip_ansi(s);
    let len = plain.chars().count();
    if len <= width {
        return format!("{s}{}", " ".repeat(width - len));
    }
    truncate_chars(&plain, width)
}

fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for n in chars.by_ref() {
                if n.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    Cow::Owned(out)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                       */
/* -------------------------------------------------------------------------- */
