/*
 * charset.rs
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

//! Charset normalization to UTF-8 (WHATWG labels via encoding_rs).

use encoding_rs::{Encoding, UTF_8};

/// True for labels naming UTF-8 itself.
pub fn is_utf8_label(label: &str) -> bool {
    let label = label.trim().trim_matches(|c| c == '"' || c == '\'');
    label.eq_ignore_ascii_case("utf-8") || label.eq_ignore_ascii_case("utf8")
}

/// Convert `bytes` from the charset `label` to UTF-8.
/// Returns None when the label is UTF-8 already or is not a known charset;
/// callers then keep the bytes unchanged.
pub fn convert_to_utf8(bytes: &[u8], label: &str) -> Option<Vec<u8>> {
    let label = label.trim().trim_matches(|c| c == '"' || c == '\'');
    if is_utf8_label(label) {
        return None;
    }
    let encoding = Encoding::for_label_no_replacement(label.as_bytes())?;
    if encoding == UTF_8 {
        return None;
    }
    let (text, _) = encoding.decode_with_bom_removal(bytes);
    Some(text.into_owned().into_bytes())
}

/// Decode to a String: the named charset when known, else UTF-8 with ISO-8859-1 fallback.
pub fn decode_to_string(bytes: &[u8], label: &str) -> String {
    match convert_to_utf8(bytes, label) {
        Some(utf8) => String::from_utf8_lossy(&utf8).into_owned(),
        None => utf8_or_latin1(bytes),
    }
}

/// Header and raw text bytes: UTF-8 when valid, otherwise each byte as ISO-8859-1.
pub fn utf8_or_latin1(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_converts() {
        let got = convert_to_utf8(b"caf\xe9", "ISO-8859-1").unwrap();
        assert_eq!(String::from_utf8(got).unwrap(), "café");
    }

    #[test]
    fn utf8_and_unknown_labels_are_left_alone() {
        assert!(convert_to_utf8(b"abc", "UTF-8").is_none());
        assert!(convert_to_utf8(b"abc", "\"utf8\"").is_none());
        assert!(convert_to_utf8(b"abc", "x-made-up").is_none());
    }

    #[test]
    fn fallback_decoding() {
        assert_eq!(utf8_or_latin1("naïve".as_bytes()), "naïve");
        assert_eq!(utf8_or_latin1(b"na\xefve"), "naïve");
        assert_eq!(decode_to_string(b"\x93hi\x94", "windows-1252"), "\u{201c}hi\u{201d}");
    }
}
