/*
 * header.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Postino, a POP3 mail retrieval client.
 *
 * Postino is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Postino is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Postino.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Header block handling: logical-line folding, field extraction into a `HeaderSet`,
//! and multipart boundary inference.

use super::rfc2047::{decode_display_text, decode_encoded_words};

/// Value(s) of one header field. A second occurrence turns `Single` into `Multiple`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    pub fn first(&self) -> &str {
        match self {
            HeaderValue::Single(v) => v,
            HeaderValue::Multiple(vs) => vs.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn last(&self) -> &str {
        match self {
            HeaderValue::Single(v) => v,
            HeaderValue::Multiple(vs) => vs.last().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            HeaderValue::Single(v) => vec![v.as_str()],
            HeaderValue::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            HeaderValue::Single(v) => {
                let first = std::mem::take(v);
                *self = HeaderValue::Multiple(vec![first, value]);
            }
            HeaderValue::Multiple(vs) => vs.push(value),
        }
    }

    fn append_to_last(&mut self, text: &str) {
        let slot = match self {
            HeaderValue::Single(v) => v,
            HeaderValue::Multiple(vs) => match vs.last_mut() {
                Some(v) => v,
                None => return,
            },
        };
        if !slot.is_empty() {
            slot.push(' ');
        }
        slot.push_str(text);
    }
}

/// Ordered header fields keyed by lower-cased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, HeaderValue)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value; repeats are kept in order.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let key = name.to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((key, HeaderValue::Single(value))),
        }
    }

    /// Replace every value of `name` with `value`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let key = name.to_ascii_lowercase();
        let value = HeaderValue::Single(value.into());
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// First value of `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).map(HeaderValue::first)
    }

    /// Last value of `name`.
    pub fn last(&self, name: &str) -> Option<&str> {
        self.get(name).map(HeaderValue::last)
    }

    /// Every value of `name`, in order.
    pub fn all(&self, name: &str) -> Vec<&str> {
        self.get(name).map(HeaderValue::values).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Headers whose raw text is kept: MIME structure headers (parameter parsing needs it)
/// and address lists (display names are decoded per mailbox, after splitting).
fn keeps_raw_value(name: &str) -> bool {
    let n = name.to_ascii_lowercase();
    n.starts_with("content-")
        || matches!(
            n.as_str(),
            "mime-version" | "from" | "to" | "cc" | "bcc" | "reply-to" | "sender"
        )
}

/// Join continuation lines (leading space or tab) onto the preceding logical line,
/// keeping a "\n" at each join. Line terminators (CRLF or LF) are removed.
pub fn fold_logical_lines(block: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in block.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.starts_with([' ', '\t']) {
            if let Some(prev) = lines.last_mut() {
                prev.push('\n');
                prev.push_str(line);
                continue;
            }
        }
        if line.trim().is_empty() {
            continue;
        }
        lines.push(line.trim_end().to_string());
    }
    lines
}

/// Collapse each folded break ("\n" plus following whitespace) to one space.
fn unfold(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, part) in value.split('\n').enumerate() {
        if i == 0 {
            out.push_str(part.trim_end());
        } else {
            let part = part.trim();
            if !part.is_empty() {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(part);
            }
        }
    }
    out.trim().to_string()
}

/// Field name: one or more ASCII letters, digits or hyphens, directly followed by ':'.
fn split_field(line: &str) -> Option<(&str, &str)> {
    let colon = line.find(':')?;
    let name = &line[..colon];
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return None;
    }
    Some((name, &line[colon + 1..]))
}

/// Parse a raw header block into a `HeaderSet`. Values other than MIME and address headers have encoded words
/// decoded. A logical line that is not a field is appended to the previous field's value.
pub fn parse_header_block(block: &str) -> HeaderSet {
    let mut headers = HeaderSet::new();
    let mut last_key: Option<String> = None;
    for logical in fold_logical_lines(block) {
        match split_field(logical.trim_start()) {
            Some((name, raw_value)) => {
                let value = unfold(raw_value);
                let value = if keeps_raw_value(name) {
                    value
                } else if name.eq_ignore_ascii_case("subject") {
                    decode_display_text(&value)
                } else {
                    decode_encoded_words(&value)
                };
                headers.insert(name, value);
                last_key = Some(name.to_ascii_lowercase());
            }
            None => {
                let Some(key) = last_key.as_deref() else {
                    continue;
                };
                let text = unfold(&logical);
                if let Some((_, v)) = headers.entries.iter_mut().find(|(k, _)| k == key) {
                    v.append_to_last(&text);
                }
            }
        }
    }
    headers
}

/// Find the multipart boundary in a raw header block: `boundary="..."` or `boundary=token`,
/// case-insensitive. None means the body is a single part.
pub fn infer_boundary(raw_head: &str) -> Option<String> {
    let lower = raw_head.to_ascii_lowercase();
    let mut from = 0;
    while let Some(i) = lower[from..].find("boundary=") {
        let value_start = from + i + "boundary=".len();
        let rest = &raw_head[value_start..];
        let found = if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted.find('"').unwrap_or(quoted.len());
            &quoted[..end]
        } else {
            let end = rest
                .find(|c: char| c == ';' || c == '"' || c.is_whitespace())
                .unwrap_or(rest.len());
            &rest[..end]
        };
        if !found.is_empty() {
            return Some(found.to_string());
        }
        from = value_start;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folding_keeps_line_break_at_join() {
        let lines = fold_logical_lines("To: a@x.com,\r\n b@y.com\r\nSubject: hi\r\n");
        assert_eq!(lines, vec!["To: a@x.com,\n b@y.com".to_string(), "Subject: hi".to_string()]);
    }

    #[test]
    fn folded_value_has_no_line_breaks() {
        let h = parse_header_block("Subject: a very\r\n\tlong subject\r\nFrom: x@y.z\r\n");
        assert_eq!(h.first("subject"), Some("a very long subject"));
        assert_eq!(h.first("FROM"), Some("x@y.z"));
        assert!(!h.first("subject").unwrap_or("").contains('\n'));
    }

    #[test]
    fn repeated_header_becomes_multiple() {
        let h = parse_header_block("Received: one\nReceived: two\nX-A: 1\n");
        assert_eq!(
            h.get("received"),
            Some(&HeaderValue::Multiple(vec!["one".into(), "two".into()]))
        );
        assert_eq!(h.last("received"), Some("two"));
        assert_eq!(h.get("x-a"), Some(&HeaderValue::Single("1".into())));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn encoded_words_decoded_except_content_headers() {
        let h = parse_header_block(
            "Subject: =?UTF-8?B?SGVsbG8=?=\nContent-Type: text/plain; name=\"=?UTF-8?B?SGVsbG8=?=\"\n",
        );
        assert_eq!(h.first("subject"), Some("Hello"));
        assert_eq!(h.first("content-type"), Some("text/plain; name=\"=?UTF-8?B?SGVsbG8=?=\""));
    }

    #[test]
    fn subject_underscores_from_decoding_are_spaces() {
        let h = parse_header_block("Subject: =?UTF-8?B?cTNfcmVwb3J0?=\nX-Tag: =?UTF-8?B?cTNfcmVwb3J0?=\n");
        assert_eq!(h.first("subject"), Some("q3 report"));
        assert_eq!(h.first("x-tag"), Some("q3_report"));
    }

    #[test]
    fn stray_line_joins_previous_field() {
        let h = parse_header_block("Subject: one\nnot a header\n");
        assert_eq!(h.first("subject"), Some("one not a header"));
    }

    #[test]
    fn boundary_quoted_and_bare() {
        assert_eq!(
            infer_boundary("Content-Type: multipart/mixed;\r\n boundary=\"abc123\"\r\n"),
            Some("abc123".to_string())
        );
        assert_eq!(
            infer_boundary("Content-Type: multipart/mixed; BOUNDARY=xyz; charset=x"),
            Some("xyz".to_string())
        );
        assert_eq!(infer_boundary("Content-Type: text/plain"), None);
    }
}
