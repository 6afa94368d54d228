/*
 * body.rs
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

//! Body part assembly: boundary splitting, transfer and charset decoding, and
//! classification of each part as inline text or attachment.
//!
//! Only one level of multipart is split. A nested multipart part is kept whole,
//! keyed by its own MIME type.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use super::charset::{convert_to_utf8, utf8_or_latin1};
use super::content_disposition::parse_content_disposition;
use super::content_type::{parse_content_type, ContentType};
use super::extensions::{extension_from_name, MimeExtensionTable};
use super::header::{parse_header_block, HeaderSet};
use super::rfc2047::{decode_encoded_words, has_encoded_word};
use super::transfer_encoding::{decode, Decoded, TransferEncoding};
use crate::email::Attachment;
use crate::hex::random_hex;

const DEFAULT_MIME: &str = "text/plain";
const DEFAULT_ATTACHMENT_MIME: &str = "application/octet-stream";

/// Inline parts keyed by MIME type, plus attachments in message order.
#[derive(Debug, Default)]
pub struct BodyParts {
    pub body: HashMap<String, Vec<u8>>,
    pub attachments: Vec<Attachment>,
}

/// One decoded part. `content` is transfer-decoded and, when a charset was declared,
/// converted to UTF-8.
#[derive(Debug, Clone)]
pub struct ContentPart {
    headers: HeaderSet,
    content_type: Option<ContentType>,
    content: Vec<u8>,
}

impl ContentPart {
    /// Decode `content` according to the part's own headers. The lower-cased MIME
    /// type is recorded in the header set under `mime`.
    pub fn decode(mut headers: HeaderSet, content: &[u8]) -> Self {
        let mut decoded = match headers.last("content-transfer-encoding") {
            Some(enc) => decode(content, TransferEncoding::parse(enc)),
            None => Decoded {
                bytes: content.to_vec(),
                is_utf8: false,
            },
        };
        let content_type = headers.first("content-type").and_then(parse_content_type);
        if let Some(ct) = &content_type {
            headers.set("mime", ct.mime_type());
            if let Some(charset) = ct.get_parameter("charset").filter(|_| !decoded.is_utf8) {
                if let Some(utf8) = convert_to_utf8(&decoded.bytes, charset) {
                    decoded.bytes = utf8;
                }
            }
        }
        Self {
            headers,
            content_type,
            content: decoded.bytes,
        }
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn content_type(&self) -> Option<&ContentType> {
        self.content_type.as_ref()
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Declared MIME type, if any.
    pub fn mime_type(&self) -> Option<String> {
        self.content_type.as_ref().map(ContentType::mime_type)
    }

    /// A `name` parameter or an `application/*` type makes a part an attachment.
    pub fn is_attachment(&self) -> bool {
        self.content_type
            .as_ref()
            .map(|ct| ct.has_parameter("name") || ct.is_primary_type("application"))
            .unwrap_or(false)
    }
}

/// Turns a raw body into `BodyParts`, naming attachments from the injected extension table.
#[derive(Debug, Clone)]
pub struct BodyPartAssembler {
    extensions: Arc<MimeExtensionTable>,
}

impl Default for BodyPartAssembler {
    fn default() -> Self {
        Self::new(MimeExtensionTable::standard())
    }
}

impl BodyPartAssembler {
    pub fn new(extensions: Arc<MimeExtensionTable>) -> Self {
        Self { extensions }
    }

    pub fn extensions(&self) -> &MimeExtensionTable {
        &self.extensions
    }

    /// Assemble `body`. With a boundary the body is split into parts; without one
    /// (or when the boundary span is missing) it is a single part. `headers` are the
    /// message headers, used for the single-part case.
    pub fn assemble(&self, body: &[u8], boundary: Option<&str>, headers: &HeaderSet) -> BodyParts {
        let mut parts = BodyParts::default();
        let Some(boundary) = boundary else {
            self.add_part(&mut parts, ContentPart::decode(headers.clone(), body));
            return parts;
        };
        match split_on_boundary(body, boundary) {
            Some(raw_parts) => {
                debug!("multipart body: {} part(s)", raw_parts.len());
                for raw in raw_parts {
                    let (head, content) = split_part(raw);
                    let part_headers = parse_header_block(&utf8_or_latin1(head));
                    self.add_part(&mut parts, ContentPart::decode(part_headers, content));
                }
            }
            None => {
                warn!("boundary {:?} not found in body, keeping it as plain text", boundary);
                parts.body.insert(DEFAULT_MIME.to_string(), body.to_vec());
            }
        }
        parts
    }

    fn add_part(&self, parts: &mut BodyParts, part: ContentPart) {
        if part.is_attachment() {
            let index = parts.attachments.len();
            parts.attachments.push(self.attachment(part, index));
            return;
        }
        let key = part.mime_type().unwrap_or_else(|| DEFAULT_MIME.to_string());
        parts.body.insert(key, part.content);
    }

    fn attachment(&self, part: ContentPart, index: usize) -> Attachment {
        let content_id = part
            .headers
            .first("content-id")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let param = |key: &str| {
            part.content_type
                .as_ref()
                .and_then(|ct| ct.get_parameter(key))
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        };
        let disposition_filename = || {
            part.headers
                .first("content-disposition")
                .and_then(parse_content_disposition)
                .and_then(|cd| cd.filename().map(str::to_string))
        };
        let name = content_id
            .clone()
            .or_else(|| param("name"))
            .or_else(|| param("filename"))
            .or_else(disposition_filename)
            .map(|n| decode_name(&n))
            .unwrap_or_else(|| format!("attach_{}", index));
        let mime = part
            .mime_type()
            .unwrap_or_else(|| DEFAULT_ATTACHMENT_MIME.to_string());
        let file_extension = self
            .extensions
            .extension_for(&mime)
            .or_else(|| extension_from_name(&name))
            .map(str::to_string);
        let id = content_id.unwrap_or_else(|| random_hex(20));
        Attachment::new(id, name, mime, file_extension, part.headers, part.content)
    }
}

fn decode_name(name: &str) -> String {
    if has_encoded_word(name) {
        decode_encoded_words(name)
    } else {
        name.to_string()
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Raw parts between the first `--boundary` and the last `--boundary--`.
/// None when that span is absent. Whitespace-only parts are dropped.
fn split_on_boundary<'a>(body: &'a [u8], boundary: &str) -> Option<Vec<&'a [u8]>> {
    let start_marker = format!("--{}", boundary);
    let end_marker = format!("--{}--", boundary);
    let start = find(body, start_marker.as_bytes(), 0)? + start_marker.len();
    let end = rfind(body, end_marker.as_bytes())?;
    if end < start {
        return None;
    }
    let span = &body[start..end];
    let delimiter = start_marker.as_bytes();
    let mut parts = Vec::new();
    let mut pos = 0;
    loop {
        let next = find(span, delimiter, pos);
        let part = &span[pos..next.unwrap_or(span.len())];
        if !part.iter().all(u8::is_ascii_whitespace) {
            parts.push(strip_trailing_line_break(part));
        }
        match next {
            Some(i) => pos = i + delimiter.len(),
            None => break,
        }
    }
    Some(parts)
}

fn strip_leading_line_break(part: &[u8]) -> Option<&[u8]> {
    part.strip_prefix(b"\r\n").or_else(|| part.strip_prefix(b"\n"))
}

fn strip_trailing_line_break(part: &[u8]) -> &[u8] {
    let part = part.strip_suffix(b"\n").unwrap_or(part);
    part.strip_suffix(b"\r").unwrap_or(part)
}

/// Split a part into header block and content at the first blank line.
/// A part with no blank line is all headers, unless it has no header
/// field at all, in which case it is all content.
fn split_part(part: &[u8]) -> (&[u8], &[u8]) {
    // the line break that ended the delimiter line
    let part = strip_leading_line_break(part).unwrap_or(part);
    // a blank line right after the delimiter: empty header block
    if let Some(content) = strip_leading_line_break(part) {
        return (&[], content);
    }
    let mut i = 0;
    while i < part.len() {
        if part[i] == b'\n' {
            let rest = &part[i + 1..];
            if rest.starts_with(b"\n") {
                return (&part[..i], &part[i + 2..]);
            }
            if rest.starts_with(b"\r\n") {
                return (&part[..i], &part[i + 3..]);
            }
        }
        i += 1;
    }
    if parse_header_block(&utf8_or_latin1(part)).is_empty() {
        (&[], part)
    } else {
        (part, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembler() -> BodyPartAssembler {
        BodyPartAssembler::default()
    }

    const MIXED: &[u8] = b"preamble\r\n\
--XYZ\r\n\
Content-Type: text/plain; charset=ISO-8859-1\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
\r\n\
caf=E9\r\n\
--XYZ\r\n\
Content-Type: text/html\r\n\
\r\n\
<p>hi</p>\r\n\
--XYZ\r\n\
Content-Type: application/pdf; name=\"x.pdf\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
JVBERi0=\r\n\
--XYZ--\r\n\
epilogue\r\n";

    #[test]
    fn splits_decodes_and_classifies() {
        let parts = assembler().assemble(MIXED, Some("XYZ"), &HeaderSet::new());
        assert_eq!(parts.body.get("text/plain").map(Vec::as_slice), Some("café".as_bytes()));
        assert_eq!(parts.body.get("text/html").map(Vec::as_slice), Some(&b"<p>hi</p>"[..]));
        assert_eq!(parts.attachments.len(), 1);
        let a = &parts.attachments[0];
        assert_eq!(a.name(), "x.pdf");
        assert_eq!(a.mime(), "application/pdf");
        assert_eq!(a.file_extension(), Some("pdf"));
        assert_eq!(a.content(), b"%PDF-");
        assert_eq!(a.id().len(), 40);
        assert_eq!(a.headers().first("mime"), Some("application/pdf"));
    }

    #[test]
    fn missing_span_keeps_whole_body_as_plain_text() {
        let body = b"--XYZ\r\nno closing delimiter\r\n";
        let parts = assembler().assemble(body, Some("XYZ"), &HeaderSet::new());
        assert_eq!(parts.body.get("text/plain").map(Vec::as_slice), Some(&body[..]));
        assert!(parts.attachments.is_empty());
    }

    #[test]
    fn single_part_uses_message_headers() {
        let headers = parse_header_block("Content-Type: text/html\r\nContent-Transfer-Encoding: base64\r\n");
        let parts = assembler().assemble(b"PGI+aGk8L2I+", None, &headers);
        assert_eq!(parts.body.get("text/html").map(Vec::as_slice), Some(&b"<b>hi</b>"[..]));
    }

    #[test]
    fn no_content_type_is_plain_text_verbatim() {
        let parts = assembler().assemble(b"just text\r\n", None, &HeaderSet::new());
        assert_eq!(parts.body.get("text/plain").map(Vec::as_slice), Some(&b"just text\r\n"[..]));
    }

    #[test]
    fn application_part_without_name_is_attachment() {
        let body = b"--B\r\nContent-Type: application/zip\r\n\r\nPK\r\n--B--\r\n";
        let parts = assembler().assemble(body, Some("B"), &HeaderSet::new());
        assert!(parts.body.is_empty());
        assert_eq!(parts.attachments[0].name(), "attach_0");
        assert_eq!(parts.attachments[0].file_extension(), Some("zip"));
    }

    #[test]
    fn content_id_takes_priority_for_id_and_name() {
        let body = b"--B\r\nContent-Type: image/png; name=\"a.png\"\r\nContent-ID: <img1@x>\r\n\r\n\x89PNG\r\n--B--";
        let parts = assembler().assemble(body, Some("B"), &HeaderSet::new());
        let a = &parts.attachments[0];
        assert_eq!(a.id(), "<img1@x>");
        assert_eq!(a.name(), "<img1@x>");
        assert_eq!(a.file_extension(), Some("png"));
    }

    #[test]
    fn disposition_filename_and_name_extension_fallback() {
        let body = b"--B\r\nContent-Type: text/x-custom; charset=us-ascii; foo=1\r\n\
Content-Disposition: attachment; filename=\"notes.md\"\r\n\r\nx\r\n--B\r\n\
Content-Type: application/x-thing; name=\"=?UTF-8?Q?d=C3=A9j=C3=A0.thing?=\"\r\n\r\ny\r\n--B--";
        let parts = assembler().assemble(body, Some("B"), &HeaderSet::new());
        // a text part with only a disposition filename stays inline
        assert_eq!(parts.body.get("text/x-custom").map(Vec::as_slice), Some(&b"x"[..]));
        let a = &parts.attachments[0];
        assert_eq!(a.name(), "déjà.thing");
        assert_eq!(a.file_extension(), Some("thing"));
    }

    #[test]
    fn nested_multipart_is_not_recursed() {
        let body = b"--OUT\r\nContent-Type: multipart/alternative; boundary=IN\r\n\r\n\
--IN\r\nContent-Type: text/plain\r\n\r\ninner\r\n--IN--\r\n--OUT--";
        let parts = assembler().assemble(body, Some("OUT"), &HeaderSet::new());
        let nested = parts.body.get("multipart/alternative").map(Vec::as_slice);
        assert!(nested.is_some_and(|b| b.starts_with(b"--IN")));
        assert!(!parts.body.contains_key("text/plain"));
    }

    #[test]
    fn same_type_last_wins() {
        let body = b"--B\r\nContent-Type: text/plain\r\n\r\none\r\n--B\r\nContent-Type: text/plain\r\n\r\ntwo\r\n--B--";
        let parts = assembler().assemble(body, Some("B"), &HeaderSet::new());
        assert_eq!(parts.body.get("text/plain").map(Vec::as_slice), Some(&b"two"[..]));
    }

    #[test]
    fn headerless_part_is_content() {
        let body = b"--B\r\nno headers here\r\n--B--";
        let parts = assembler().assemble(body, Some("B"), &HeaderSet::new());
        assert_eq!(parts.body.get("text/plain").map(Vec::as_slice), Some(&b"no headers here"[..]));
    }

    #[test]
    fn empty_header_block_keeps_header_like_text() {
        let body = b"--B\r\n\r\nTo: everyone\r\nmeeting at 5\r\n--B--";
        let parts = assembler().assemble(body, Some("B"), &HeaderSet::new());
        assert_eq!(
            parts.body.get("text/plain").map(Vec::as_slice),
            Some(&b"To: everyone\r\nmeeting at 5"[..])
        );
    }

    #[test]
    fn empty_header_block_has_no_leading_line_break() {
        let parts = assembler().assemble(b"--B\r\n\r\nplain words\r\n--B--", Some("B"), &HeaderSet::new());
        assert_eq!(parts.body.get("text/plain").map(Vec::as_slice), Some(&b"plain words"[..]));
        let parts = assembler().assemble(b"--B\n\nlf only\n--B--", Some("B"), &HeaderSet::new());
        assert_eq!(parts.body.get("text/plain").map(Vec::as_slice), Some(&b"lf only"[..]));
    }

    #[test]
    fn custom_extension_table_is_used() {
        let table = Arc::new(MimeExtensionTable::new([("bin", ["application/pdf"])]));
        let body = b"--B\r\nContent-Type: application/pdf\r\n\r\n%PDF\r\n--B--";
        let parts = BodyPartAssembler::new(table).assemble(body, Some("B"), &HeaderSet::new());
        assert_eq!(parts.attachments[0].file_extension(), Some("bin"));
    }
}
