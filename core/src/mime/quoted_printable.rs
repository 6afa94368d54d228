/*
 * quoted_printable.rs
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

//! Quoted-Printable decoder for Content-Transfer-Encoding (RFC 2045) and the Q encoded-word form.

const HEX_DECODE: [i8; 256] = {
    let mut t = [-1i8; 256];
    let mut i = 0u8;
    while i < 10 {
        t[(b'0' + i) as usize] = i as i8;
        i = i.wrapping_add(1);
    }
    let mut i = 0u8;
    while i < 6 {
        t[(b'A' + i) as usize] = (10 + i) as i8;
        t[(b'a' + i) as usize] = (10 + i) as i8;
        i = i.wrapping_add(1);
    }
    t
};

/// Decode a complete quoted-printable body. Handles =XX and soft line breaks
/// (=CRLF, =LF, and trailing whitespace before them). Malformed escapes pass through literally.
pub fn decode(src: &[u8]) -> Vec<u8> {
    let mut dst = Vec::with_capacity(src.len());
    let mut pos = 0;
    while pos < src.len() {
        let b = src[pos];
        if b != b'=' {
            dst.push(b);
            pos += 1;
            continue;
        }
        let rest = &src[pos + 1..];
        if rest.len() >= 2 {
            let v1 = HEX_DECODE[rest[0] as usize];
            let v2 = HEX_DECODE[rest[1] as usize];
            if v1 >= 0 && v2 >= 0 {
                dst.push(((v1 << 4) | v2) as u8);
                pos += 3;
                continue;
            }
        }
        if let Some(skip) = soft_break_len(rest) {
            pos += 1 + skip;
            continue;
        }
        dst.push(b);
        pos += 1;
    }
    dst
}

/// Length of "[ \t]*\r?\n" at the start of `rest`, if it is a soft line break.
fn soft_break_len(rest: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < rest.len() && (rest[i] == b' ' || rest[i] == b'\t') {
        i += 1;
    }
    if rest.get(i) == Some(&b'\r') {
        i += 1;
    }
    if rest.get(i) == Some(&b'\n') {
        return Some(i + 1);
    }
    // "=" as the very last byte also counts as a soft break
    if i == rest.len() {
        return Some(i);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_escapes() {
        assert_eq!(decode(b"caf=C3=A9"), "café".as_bytes());
        assert_eq!(decode(b"a=3db"), b"a=b");
    }

    #[test]
    fn soft_breaks_join_lines() {
        assert_eq!(decode(b"long =\r\nline"), b"long line");
        assert_eq!(decode(b"long =\nline"), b"long line");
        assert_eq!(decode(b"pad=  \r\nded"), b"padded");
        assert_eq!(decode(b"end="), b"end");
    }

    #[test]
    fn malformed_escape_is_literal() {
        assert_eq!(decode(b"100=%"), b"100=%");
        assert_eq!(decode(b"=G1"), b"=G1");
    }
}
