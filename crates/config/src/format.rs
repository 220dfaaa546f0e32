//! INI file codec
//!
//! Parsing keeps comments attached to the key or section that follows them so
//! a rewrite can put them back. Values are quoted only when they would not
//! survive a bare round-trip.

use std::collections::{BTreeMap, HashMap};

/// Section holding global keys; its keys carry no namespace prefix
pub const DEFAULT_SECTION: &str = "clansphere";

/// Where a preserved comment block is re-emitted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommentAnchor {
    Section(String),
    Key(String),
    EndOfFile,
}

pub type Comments = HashMap<CommentAnchor, String>;

/// Raw values and comments read from a file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedConfig {
    pub values: BTreeMap<String, String>,
    pub comments: Comments,
}

/// Drop the default-section prefix from a key, if present
pub fn normalize_key(key: &str) -> &str {
    key.strip_prefix(DEFAULT_SECTION)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(key)
}

/// Split `section/name`; keys without a slash live in the default section
pub fn split_key(key: &str) -> (&str, &str) {
    key.split_once('/').unwrap_or((DEFAULT_SECTION, key))
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Quote a value for writing
pub fn quote_value(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let bare = value.trim() == value
        && !value.starts_with(is_quote)
        && !value.ends_with(is_quote)
        && !value.contains(['\n', '\r']);
    if bare {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '"' => quoted.push_str("\\\""),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

/// Undo [`quote_value`]; unquoted values come back verbatim
pub fn unquote_value(value: &str) -> String {
    let mut chars = value.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return value.to_string();
    };
    if !is_quote(first) || first != last {
        return value.to_string();
    }

    let inner = &value[1..value.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Parse file contents
///
/// Blank and comment lines (`#` or `;`) collect into a pending block that
/// attaches to the next section header or key, or to the end of the file.
/// A non-empty line without `=` is a key with an empty value.
pub fn parse(text: &str) -> ParsedConfig {
    let mut parsed = ParsedConfig::default();
    let mut section = DEFAULT_SECTION.to_string();
    let mut pending = String::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(['#', ';']) {
            pending.push_str(line);
            pending.push('\n');
            continue;
        }

        let anchor = if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len() - 1].trim().to_string();
            CommentAnchor::Section(section.clone())
        } else {
            let (key, value) = match line.split_once('=') {
                Some((key, value)) => (key.trim(), unquote_value(value.trim())),
                None => (line, String::new()),
            };
            let key = if section == DEFAULT_SECTION {
                key.to_string()
            } else {
                format!("{section}/{key}")
            };
            parsed.values.insert(key.clone(), value);
            CommentAnchor::Key(key)
        };

        if !pending.trim().is_empty() {
            parsed.comments.insert(anchor, std::mem::take(&mut pending));
        }
        pending.clear();
    }

    if !pending.trim().is_empty() {
        parsed.comments.insert(CommentAnchor::EndOfFile, pending);
    }
    parsed
}

/// Serialize values and comments
///
/// The default section always comes first, followed by the other sections
/// sorted case-insensitively; keys are sorted within their section.
pub fn render(values: &BTreeMap<String, String>, comments: &Comments) -> String {
    let mut sections: BTreeMap<&str, Vec<(&str, &str, &str)>> = BTreeMap::new();
    sections.entry(DEFAULT_SECTION).or_default();
    for (key, value) in values {
        let (section, name) = split_key(key);
        sections
            .entry(section)
            .or_default()
            .push((name, key.as_str(), value.as_str()));
    }

    let global = sections.remove(DEFAULT_SECTION).unwrap_or_default();
    let mut ordered: Vec<(&str, Vec<(&str, &str, &str)>)> = sections.into_iter().collect();
    ordered.sort_by(|(a, _), (b, _)| a.to_lowercase().cmp(&b.to_lowercase()).then(a.cmp(b)));
    ordered.insert(0, (DEFAULT_SECTION, global));

    let mut out = String::new();
    for (idx, (section, mut items)) in ordered.into_iter().enumerate() {
        match comments.get(&CommentAnchor::Section(section.to_string())) {
            Some(comment) => out.push_str(comment),
            None if idx > 0 => out.push('\n'),
            None => {}
        }
        out.push('[');
        out.push_str(section);
        out.push_str("]\n");

        items.sort_by(|a, b| a.0.cmp(b.0));
        for (name, key, value) in items {
            if let Some(comment) = comments.get(&CommentAnchor::Key(key.to_string())) {
                out.push_str(comment);
            }
            out.push_str(name);
            out.push_str(" = ");
            out.push_str(&quote_value(value));
            out.push('\n');
        }
    }

    if let Some(comment) = comments.get(&CommentAnchor::EndOfFile) {
        out.push_str(comment);
    }
    out
}
