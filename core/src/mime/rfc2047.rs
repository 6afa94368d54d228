/*
 * rfc2047.rs
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

//! RFC 2047 encoded-word decoding (e.g. =?charset?q?text?=).
//! Used for header values, display names and attachment names.

use super::charset::decode_to_string;
use super::quoted_printable;
use super::transfer_encoding::decode_base64;

/// True if `s` contains something shaped like an encoded word.
pub fn has_encoded_word(s: &str) -> bool {
    s.find("=?").is_some_and(|i| s[i + 2..].contains("?="))
}

/// Expand encoded words in `s`. Whitespace between two adjacent encoded words is dropped;
/// text that only looks like an encoded word is kept literally.
pub fn decode_encoded_words(s: &str) -> String {
    expand(s, false)
}

/// As `decode_encoded_words`, but underscores in the decoded text become spaces
/// whatever the word's encoding. Used for the subject and display names.
pub fn decode_display_text(s: &str) -> String {
    expand(s, true)
}

fn expand(s: &str, underscores_as_spaces: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    let mut last_was_word = false;

    while !rest.is_empty() {
        let Some(start) = rest.find("=?") else {
            out.push_str(rest);
            break;
        };
        let literal = &rest[..start];
        match decode_one_encoded_word(&rest[start..]) {
            Some((decoded, consumed)) => {
                // folding whitespace between adjacent encoded words is not content
                if !(last_was_word && literal.trim().is_empty()) {
                    out.push_str(literal);
                }
                if underscores_as_spaces {
                    out.push_str(&decoded.replace('_', " "));
                } else {
                    out.push_str(&decoded);
                }
                rest = &rest[start + consumed..];
                last_was_word = true;
            }
            None => {
                out.push_str(&rest[..start + 2]);
                rest = &rest[start + 2..];
                last_was_word = false;
            }
        }
    }
    out
}

/// Decode one encoded word at the start of `s`. Returns the text and the bytes consumed.
fn decode_one_encoded_word(s: &str) -> Option<(String, usize)> {
    let body = s.strip_prefix("=?")?;
    let q1 = body.find('?')?;
    let charset = &body[..q1];
    if charset.is_empty() || charset.contains(char::is_whitespace) {
        return None;
    }
    let after_charset = &body[q1 + 1..];
    let mut chars = after_charset.chars();
    let encoding = chars.next()?.to_ascii_lowercase();
    if !matches!(encoding, 'b' | 'q') || chars.next()? != '?' {
        return None;
    }
    let payload_and_rest = &after_charset[2..];
    let end = payload_and_rest.find("?=")?;
    let payload = &payload_and_rest[..end];
    if payload.contains(char::is_whitespace) {
        return None;
    }
    let bytes = match encoding {
        'b' => decode_base64(payload.as_bytes()),
        _ => decode_q(payload.as_bytes()),
    };
    // RFC 2231 language suffix: charset*lang
    let charset = charset.split('*').next().unwrap_or(charset);
    let decoded = decode_to_string(&bytes, charset);
    let consumed = 2 + q1 + 1 + 2 + end + 2;
    Some((decoded, consumed))
}

/// Q encoding: _ = space, rest is quoted-printable.
fn decode_q(payload: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = payload
        .iter()
        .map(|&b| if b == b'_' { b' ' } else { b })
        .collect();
    quoted_printable::decode(&spaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_encoded_words_b() {
        assert_eq!(decode_encoded_words("=?UTF-8?B?SGVsbG8=?="), "Hello");
    }

    #[test]
    fn decode_encoded_words_q() {
        assert_eq!(decode_encoded_words("=?UTF-8?Q?Hello_World?="), "Hello World");
        assert_eq!(decode_encoded_words("=?iso-8859-1?q?caf=E9?="), "café");
    }

    #[test]
    fn decode_encoded_words_mixed() {
        assert_eq!(decode_encoded_words("Hello =?UTF-8?B?V29ybGQ=?=!"), "Hello World!");
    }

    #[test]
    fn adjacent_words_join_without_space() {
        assert_eq!(
            decode_encoded_words("=?UTF-8?Q?Gr=C3=BC?= =?UTF-8?Q?=C3=9Fe?="),
            "Grüße"
        );
    }

    #[test]
    fn display_text_spaces_decoded_underscores() {
        // "snake_case" in base64
        assert_eq!(decode_display_text("=?UTF-8?B?c25ha2VfY2FzZQ==?="), "snake case");
        assert_eq!(decode_display_text("=?UTF-8?Q?a=5Fb?= keep_this"), "a b keep_this");
        assert_eq!(decode_encoded_words("=?UTF-8?B?c25ha2VfY2FzZQ==?="), "snake_case");
    }

    #[test]
    fn lookalikes_stay_literal() {
        assert_eq!(decode_encoded_words("a =? b"), "a =? b");
        assert_eq!(decode_encoded_words("=?UTF-8?X?abc?="), "=?UTF-8?X?abc?=");
        assert!(!has_encoded_word("plain subject"));
        assert!(has_encoded_word("=?utf-8?b?eA==?="));
    }
}
