/*
 * address_parser.rs
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

//! RFC 5322 address list parsing (From, To, Cc, Bcc).
//!
//! Tolerant: an entry that does not yield both a local part and a domain is skipped
//! instead of failing the whole list.

use super::email_address::EmailAddress;
use crate::mime::rfc2047::{decode_display_text, has_encoded_word};

/// Parse a comma-separated list of addresses from a header value.
/// Supports "Display Name" <local@domain>, Display Name <local@domain>,
/// bare local@domain and local@domain (Comment Name).
pub fn parse_email_address_list(value: &str) -> Vec<EmailAddress> {
    let bytes = value.as_bytes();
    let len = bytes.len();
    let mut pos = 0;
    let mut out = Vec::new();

    while pos < len {
        skip_ws(bytes, len, &mut pos);
        if pos >= len {
            break;
        }
        let end = entry_end(bytes, pos);
        if let Some(addr) = parse_one_address(&value[pos..end]) {
            out.push(addr);
        }
        pos = end + 1;
    }
    out
}

fn skip_ws(bytes: &[u8], len: usize, pos: &mut usize) {
    while *pos < len && (bytes[*pos] == b' ' || bytes[*pos] == b'\t' || bytes[*pos] == b'\r' || bytes[*pos] == b'\n' || bytes[*pos] == b',') {
        *pos += 1;
    }
}

/// End of one list entry: the next ',' outside quotes, angle brackets and comments.
fn entry_end(bytes: &[u8], start: usize) -> usize {
    let mut pos = start;
    let mut in_quotes = false;
    let mut in_angle = false;
    let mut comment_depth = 0usize;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if in_quotes => pos += 1,
            b'"' if comment_depth == 0 => in_quotes = !in_quotes,
            b'<' if !in_quotes && comment_depth == 0 => in_angle = true,
            b'>' if !in_quotes && comment_depth == 0 => in_angle = false,
            b'(' if !in_quotes => comment_depth += 1,
            b')' if !in_quotes && comment_depth > 0 => comment_depth -= 1,
            b',' if !in_quotes && !in_angle && comment_depth == 0 => return pos,
            _ => {}
        }
        pos += 1;
    }
    bytes.len()
}

fn parse_one_address(entry: &str) -> Option<EmailAddress> {
    let entry = entry.trim();
    let (display, addr_spec) = match (entry.find('<'), entry.rfind('>')) {
        (Some(open), Some(close)) if close > open => {
            (clean_display_name(&entry[..open]), entry[open + 1..close].trim().to_string())
        }
        (Some(open), None) => (clean_display_name(&entry[..open]), entry[open + 1..].trim().to_string()),
        _ => {
            let (spec, comment) = split_comment(entry);
            (comment.and_then(|c| clean_display_name(&c)), spec)
        }
    };
    let at = addr_spec.rfind('@')?;
    let local = addr_spec[..at].trim().trim_matches('"');
    let domain = addr_spec[at + 1..].trim();
    if local.is_empty() || domain.is_empty() {
        return None;
    }
    Some(EmailAddress::new(display, local, domain))
}

/// "local@domain (Name)" -> ("local@domain", Some("Name")).
fn split_comment(entry: &str) -> (String, Option<String>) {
    match (entry.find('('), entry.rfind(')')) {
        (Some(open), Some(close)) if close > open => {
            let spec = format!("{}{}", &entry[..open], &entry[close + 1..]);
            (spec.trim().to_string(), Some(entry[open + 1..close].to_string()))
        }
        _ => (entry.to_string(), None),
    }
}

/// Trim, unquote and unescape a display name; decode encoded words. Empty names become None.
fn clean_display_name(raw: &str) -> Option<String> {
    let mut name = raw.trim();
    if name.len() >= 2 && name.starts_with('"') && name.ends_with('"') {
        name = &name[1..name.len() - 1];
    }
    let mut unescaped = String::with_capacity(name.len());
    let mut chars = name.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                unescaped.push(next);
            }
        } else {
            unescaped.push(c);
        }
    }
    let decoded = if has_encoded_word(&unescaped) {
        decode_display_text(&unescaped)
    } else {
        unescaped
    };
    let decoded = decoded.trim();
    if decoded.is_empty() {
        None
    } else {
        Some(decoded.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_and_bare_names() {
        let list = parse_email_address_list("\"Doe, Jane\" <jane@example.com>, Bob Smith <bob@example.org>");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].display_name(), Some("Doe, Jane"));
        assert_eq!(list[0].address(), "jane@example.com");
        assert_eq!(list[1].display_name(), Some("Bob Smith"));
        assert_eq!(list[1].domain(), "example.org");
    }

    #[test]
    fn bare_address_has_no_name() {
        let list = parse_email_address_list("alice@example.com");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].display_name(), None);
        assert_eq!(list[0].local_part(), "alice");
    }

    #[test]
    fn comment_becomes_name() {
        let list = parse_email_address_list("carol@example.com (Carol C)");
        assert_eq!(list[0].display_name(), Some("Carol C"));
        assert_eq!(list[0].address(), "carol@example.com");
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let list = parse_email_address_list("undisclosed-recipients:;, <@nowhere>, ok@x.org");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].address(), "ok@x.org");
        assert!(parse_email_address_list("").is_empty());
    }

    #[test]
    fn encoded_display_name() {
        let list = parse_email_address_list("=?UTF-8?Q?J=C3=BCrgen_M?= <j@example.de>");
        assert_eq!(list[0].display_name(), Some("Jürgen M"));
        // "Ops_Team" in base64
        let list = parse_email_address_list("=?UTF-8?B?T3BzX1RlYW0=?= <ops@example.de>");
        assert_eq!(list[0].display_name(), Some("Ops Team"));
    }
}
