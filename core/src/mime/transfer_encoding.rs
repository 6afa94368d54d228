/*
 * transfer_encoding.rs
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

//! Content-Transfer-Encoding (RFC 2045 §6) decoding.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use encoding_rs::ISO_2022_JP;
use log::warn;

use super::quoted_printable;

/// Padding-indifferent, trailing-bit tolerant base64 for mail bodies.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    Base64,
    QuotedPrintable,
    Binary,
    /// 7bit text; ISO-2022-JP escape sequences are converted to UTF-8.
    SevenBit,
    /// 8bit or an unknown token: content passes through.
    Identity,
}

impl TransferEncoding {
    pub fn parse(value: &str) -> Self {
        let v = value.trim().trim_matches('"');
        if v.eq_ignore_ascii_case("base64") {
            TransferEncoding::Base64
        } else if v.eq_ignore_ascii_case("quoted-printable") {
            TransferEncoding::QuotedPrintable
        } else if v.eq_ignore_ascii_case("binary") {
            TransferEncoding::Binary
        } else if v.eq_ignore_ascii_case("7bit") {
            TransferEncoding::SevenBit
        } else {
            TransferEncoding::Identity
        }
    }
}

/// Decoded content and whether it is already UTF-8 text (no further charset conversion).
#[derive(Debug, Clone)]
pub struct Decoded {
    pub bytes: Vec<u8>,
    pub is_utf8: bool,
}

/// Undo the transfer encoding. Never fails: undecodable input is returned as-is.
pub fn decode(content: &[u8], encoding: TransferEncoding) -> Decoded {
    match encoding {
        TransferEncoding::Base64 => Decoded {
            bytes: decode_base64(content),
            is_utf8: false,
        },
        TransferEncoding::QuotedPrintable => Decoded {
            bytes: quoted_printable::decode(content),
            is_utf8: false,
        },
        TransferEncoding::SevenBit if content.contains(&0x1b) => {
            let (text, _) = ISO_2022_JP.decode_without_bom_handling(content);
            Decoded {
                bytes: text.into_owned().into_bytes(),
                is_utf8: true,
            }
        }
        TransferEncoding::SevenBit | TransferEncoding::Binary | TransferEncoding::Identity => Decoded {
            bytes: content.to_vec(),
            is_utf8: false,
        },
    }
}

/// Base64 with line breaks and stray characters ignored. A dangling final
/// sextet is dropped; anything still undecodable is passed through.
pub fn decode_base64(content: &[u8]) -> Vec<u8> {
    let mut clean: Vec<u8> = content
        .iter()
        .copied()
        .filter(|b| b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/')
        .collect();
    if clean.len() % 4 == 1 {
        clean.pop();
    }
    match LENIENT_BASE64.decode(&clean) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("undecodable base64 content, keeping raw bytes: {}", e);
            content.to_vec()
        }
    }
}
