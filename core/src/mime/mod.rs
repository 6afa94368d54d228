/*
 * mod.rs
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

//! Tolerant MIME and RFC 5322 message assembly: header decoding, multipart splitting,
//! transfer and charset decoding, attachment naming.

mod body;
mod charset;
mod content_disposition;
mod content_type;
mod extensions;
mod header;
mod message;
mod quoted_printable;
mod rfc2047;
mod rfc5322;
mod transfer_encoding;

use thiserror::Error;

pub use body::{BodyPartAssembler, BodyParts, ContentPart};
pub use charset::{convert_to_utf8, decode_to_string, utf8_or_latin1};
pub use content_disposition::{parse_content_disposition, ContentDisposition};
pub use content_type::{parse_content_type, ContentType};
pub use extensions::{extension_from_name, MimeExtensionTable};
pub use header::{fold_logical_lines, infer_boundary, parse_header_block, HeaderSet, HeaderValue};
pub use message::{MessageAssembler, NO_SUBJECT};
pub use rfc2047::{decode_display_text, decode_encoded_words};
pub use rfc5322::{
    parse_email_address_list, parse_envelope, parse_epoch_seconds, parse_rfc5322_date,
    EmailAddress, EnvelopeHeaders,
};
pub use transfer_encoding::{decode_base64, TransferEncoding};

/// A message that yields no usable structure at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MimeParseError {
    #[error("message is empty")]
    Empty,
    #[error("no header fields found")]
    NoHeaders,
}
