/*
 * content_type.rs
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

//! Content-Type header (RFC 2045): tolerant tokenizer into type, subtype and attributes.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use super::charset::decode_to_string;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    primary_type: String,
    sub_type: Option<String>,
    attributes: HashMap<String, String>,
}

impl ContentType {
    pub fn get_primary_type(&self) -> &str {
        &self.primary_type
    }

    pub fn get_sub_type(&self) -> Option<&str> {
        self.sub_type.as_deref()
    }

    /// Lower-cased "primary/sub" (or just the primary type when no subtype was given).
    pub fn mime_type(&self) -> String {
        match &self.sub_type {
            Some(sub) => format!("{}/{}", self.primary_type, sub),
            None => self.primary_type.clone(),
        }
    }

    pub fn is_primary_type(&self, t: &str) -> bool {
        self.primary_type.eq_ignore_ascii_case(t)
    }

    pub fn get_parameter(&self, name: &str) -> Option<&str> {
        self.attributes.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.attributes.contains_key(&name.to_ascii_lowercase())
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }
}

/// Parse a Content-Type value. Never fails on junk: an empty value gives None,
/// anything else gives at least a primary type.
pub fn parse_content_type(value: &str) -> Option<ContentType> {
    let mut segments = split_parameters(value);
    let full = segments.next()?.trim().to_ascii_lowercase();
    if full.is_empty() {
        return None;
    }
    let (primary_type, sub_type) = match full.split_once('/') {
        Some((p, s)) => (p.trim().to_string(), Some(s.trim().to_string())),
        None => (full, None),
    };
    Some(ContentType {
        primary_type,
        sub_type,
        attributes: parse_parameter_list(segments),
    })
}

/// Split on ';' outside double quotes.
pub(crate) fn split_parameters(value: &str) -> impl Iterator<Item = &str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts.into_iter()
}

/// `key=value` segments into a lower-cased key map. Surrounding quotes are stripped;
/// segments without '=' or with an unusable key are skipped. RFC 2231 `key*=charset''value`
/// is percent-decoded and stored under the plain key.
pub(crate) fn parse_parameter_list<'a>(segments: impl Iterator<Item = &'a str>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for segment in segments {
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty()
            || !key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'*')
        {
            continue;
        }
        let value = strip_quotes(value.trim());
        if let Some(plain) = key.strip_suffix('*') {
            map.insert(plain.to_string(), decode_extended_value(value));
        } else {
            map.entry(key).or_insert_with(|| value.to_string());
        }
    }
    map
}

fn strip_quotes(v: &str) -> &str {
    let v = v.strip_prefix(['"', '\'']).unwrap_or(v);
    v.strip_suffix(['"', '\'']).unwrap_or(v)
}

/// RFC 2231 extended value: charset'language'percent-encoded.
fn decode_extended_value(value: &str) -> String {
    let mut parts = value.splitn(3, '\'');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(charset), Some(_lang), Some(encoded)) => {
            let bytes: Vec<u8> = percent_decode_str(encoded).collect();
            decode_to_string(&bytes, charset)
        }
        _ => percent_decode_str(value).decode_utf8_lossy().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_and_attributes() {
        let ct = parse_content_type("Text/HTML; charset=\"ISO-8859-1\"; format=flowed").unwrap();
        assert_eq!(ct.get_primary_type(), "text");
        assert_eq!(ct.get_sub_type(), Some("html"));
        assert_eq!(ct.mime_type(), "text/html");
        assert_eq!(ct.get_parameter("Charset"), Some("ISO-8859-1"));
        assert_eq!(ct.get_parameter("format"), Some("flowed"));
    }

    #[test]
    fn quoted_semicolon_stays_in_value() {
        let ct = parse_content_type("application/pdf; name=\"a;b.pdf\"").unwrap();
        assert_eq!(ct.get_parameter("name"), Some("a;b.pdf"));
    }

    #[test]
    fn single_quotes_and_junk_segments() {
        let ct = parse_content_type("application/zip; junk; name='x.zip'; =bad").unwrap();
        assert_eq!(ct.get_parameter("name"), Some("x.zip"));
        assert_eq!(ct.attributes().len(), 1);
    }

    #[test]
    fn missing_subtype_is_tolerated() {
        let ct = parse_content_type("text").unwrap();
        assert_eq!(ct.mime_type(), "text");
        assert!(parse_content_type("   ").is_none());
    }

    #[test]
    fn rfc2231_extended_value() {
        let ct = parse_content_type("application/pdf; name*=UTF-8''r%C3%A9sum%C3%A9.pdf").unwrap();
        assert_eq!(ct.get_parameter("name"), Some("résumé.pdf"));
    }
}
