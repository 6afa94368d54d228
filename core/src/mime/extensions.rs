/*
 * extensions.rs
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

//! MIME type to file extension lookup.
//!
//! The table is ordered; the first entry listing a type wins. Note that
//! application/octet-stream is listed under "pdf".

use std::sync::{Arc, OnceLock};

/// Default table: extension followed by the MIME types that map to it.
const STANDARD_TABLE: &[(&str, &[&str])] = &[
    ("png", &["image/png", "image/x-png"]),
    (
        "bmp",
        &[
            "image/bmp",
            "image/x-bmp",
            "image/x-bitmap",
            "image/x-xbitmap",
            "image/x-win-bitmap",
            "image/x-windows-bmp",
            "image/ms-bmp",
            "image/x-ms-bmp",
            "application/bmp",
            "application/x-bmp",
            "application/x-win-bitmap",
        ],
    ),
    ("gif", &["image/gif"]),
    ("jpeg", &["image/jpeg", "image/pjpeg"]),
    ("xspf", &["application/xspf+xml"]),
    ("vlc", &["application/videolan"]),
    ("wmv", &["video/x-ms-wmv", "video/x-ms-asf"]),
    ("au", &["audio/x-au"]),
    ("ac3", &["audio/ac3"]),
    ("flac", &["audio/x-flac"]),
    ("ogg", &["audio/ogg", "video/ogg", "application/ogg"]),
    ("kmz", &["application/vnd.google-earth.kmz"]),
    ("kml", &["application/vnd.google-earth.kml+xml"]),
    ("rtx", &["text/richtext"]),
    ("rtf", &["text/rtf"]),
    ("jar", &["application/java-archive", "application/x-java-application", "application/x-jar"]),
    (
        "zip",
        &[
            "application/x-zip",
            "application/zip",
            "application/x-zip-compressed",
            "application/s-compressed",
            "multipart/x-zip",
        ],
    ),
    ("7zip", &["application/x-compressed"]),
    ("xml", &["application/xml", "text/xml"]),
    ("svg", &["image/svg+xml"]),
    ("3g2", &["video/3gpp2"]),
    ("3gp", &["video/3gp", "video/3gpp"]),
    ("mp4", &["video/mp4"]),
    ("m4a", &["audio/x-m4a"]),
    ("f4v", &["video/x-f4v"]),
    ("flv", &["video/x-flv"]),
    ("webm", &["video/webm"]),
    ("aac", &["audio/x-acc"]),
    ("m4u", &["application/vnd.mpegurl"]),
    ("pdf", &["application/pdf", "application/octet-stream"]),
    ("pptx", &["application/vnd.openxmlformats-officedocument.presentationml.presentation"]),
    (
        "ppt",
        &[
            "application/powerpoint",
            "application/vnd.ms-powerpoint",
            "application/vnd.ms-office",
            "application/msword",
        ],
    ),
    ("docx", &["application/vnd.openxmlformats-officedocument.wordprocessingml.document"]),
    (
        "xlsx",
        &[
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "application/vnd.ms-excel",
        ],
    ),
    ("xl", &["application/excel"]),
    (
        "xls",
        &[
            "application/msexcel",
            "application/x-msexcel",
            "application/x-ms-excel",
            "application/x-excel",
            "application/x-dos_ms_excel",
            "application/xls",
            "application/x-xls",
        ],
    ),
    ("xsl", &["text/xsl"]),
    ("mpeg", &["video/mpeg"]),
    ("mov", &["video/quicktime"]),
    ("avi", &["video/x-msvideo", "video/msvideo", "video/avi", "application/x-troff-msvideo"]),
    ("movie", &["video/x-sgi-movie"]),
    ("log", &["text/x-log"]),
    ("txt", &["text/plain"]),
    ("css", &["text/css"]),
    ("html", &["text/html"]),
    ("wav", &["audio/x-wav", "audio/wave", "audio/wav"]),
    ("xhtml", &["application/xhtml+xml"]),
    ("tar", &["application/x-tar"]),
    ("tgz", &["application/x-gzip-compressed"]),
    ("psd", &["application/x-photoshop", "image/vnd.adobe.photoshop"]),
    ("exe", &["application/x-msdownload"]),
    ("js", &["application/x-javascript"]),
    ("mp3", &["audio/mpeg", "audio/mpg", "audio/mpeg3", "audio/mp3"]),
    ("rar", &["application/x-rar", "application/rar", "application/x-rar-compressed"]),
    ("gzip", &["application/x-gzip"]),
    (
        "hqx",
        &[
            "application/mac-binhex40",
            "application/mac-binhex",
            "application/x-binhex40",
            "application/x-mac-binhex40",
        ],
    ),
    ("cpt", &["application/mac-compactpro"]),
    (
        "bin",
        &[
            "application/macbinary",
            "application/mac-binary",
            "application/x-binary",
            "application/x-macbinary",
        ],
    ),
    ("oda", &["application/oda"]),
    ("ai", &["application/postscript"]),
    ("smil", &["application/smil"]),
    ("mif", &["application/vnd.mif"]),
    ("wbxml", &["application/wbxml"]),
    ("wmlc", &["application/wmlc"]),
    ("dcr", &["application/x-director"]),
    ("dvi", &["application/x-dvi"]),
    ("gtar", &["application/x-gtar"]),
    (
        "php",
        &[
            "application/x-httpd-php",
            "application/php",
            "application/x-php",
            "text/php",
            "text/x-php",
            "application/x-httpd-php-source",
        ],
    ),
    ("swf", &["application/x-shockwave-flash"]),
    ("sit", &["application/x-stuffit"]),
    ("z", &["application/x-compress"]),
    ("mid", &["audio/midi"]),
    ("aif", &["audio/x-aiff", "audio/aiff"]),
    ("ram", &["audio/x-pn-realaudio"]),
    ("rpm", &["audio/x-pn-realaudio-plugin"]),
    ("ra", &["audio/x-realaudio"]),
    ("rv", &["video/vnd.rn-realvideo"]),
    ("jp2", &["image/jp2", "video/mj2", "image/jpx", "image/jpm"]),
    ("tiff", &["image/tiff"]),
    ("eml", &["message/rfc822"]),
    ("pem", &["application/x-x509-user-cert", "application/x-pem-file"]),
    ("p10", &["application/x-pkcs10", "application/pkcs10"]),
    ("p12", &["application/x-pkcs12"]),
    ("p7a", &["application/x-pkcs7-signature"]),
    ("p7c", &["application/pkcs7-mime", "application/x-pkcs7-mime"]),
    ("p7r", &["application/x-pkcs7-certreqresp"]),
    ("p7s", &["application/pkcs7-signature"]),
    ("crt", &["application/x-x509-ca-cert", "application/pkix-cert"]),
    ("crl", &["application/pkix-crl", "application/pkcs-crl"]),
    ("pgp", &["application/pgp"]),
    ("gpg", &["application/gpg-keys"]),
    ("rsa", &["application/x-pkcs7"]),
    ("ics", &["text/calendar"]),
    ("zsh", &["text/x-scriptzsh"]),
    (
        "cdr",
        &[
            "application/cdr",
            "application/coreldraw",
            "application/x-cdr",
            "application/x-coreldraw",
            "image/cdr",
            "image/x-cdr",
            "zz-application/zz-winassoc-cdr",
        ],
    ),
    ("wma", &["audio/x-ms-wma"]),
    ("vcf", &["text/x-vcard"]),
    ("srt", &["text/srt"]),
    ("vtt", &["text/vtt"]),
    ("ico", &["image/x-icon", "image/x-ico", "image/vnd.microsoft.icon"]),
    (
        "csv",
        &[
            "text/x-comma-separated-values",
            "text/comma-separated-values",
            "application/vnd.msexcel",
        ],
    ),
    ("json", &["application/json", "text/json"]),
];

/// Ordered extension table, read-only once built.
#[derive(Debug, Clone)]
pub struct MimeExtensionTable {
    entries: Vec<(String, Vec<String>)>,
}

impl MimeExtensionTable {
    /// Build a table from (extension, MIME types) pairs, keeping their order.
    pub fn new<I, E, M, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (E, M)>,
        E: Into<String>,
        M: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(ext, mimes)| {
                    (
                        ext.into(),
                        mimes.into_iter().map(|m| m.into().to_ascii_lowercase()).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Process-wide default table, built on first use.
    pub fn standard() -> Arc<MimeExtensionTable> {
        static TABLE: OnceLock<Arc<MimeExtensionTable>> = OnceLock::new();
        TABLE
            .get_or_init(|| {
                Arc::new(MimeExtensionTable::new(
                    STANDARD_TABLE.iter().map(|(ext, mimes)| (*ext, mimes.iter().copied())),
                ))
            })
            .clone()
    }

    /// Extension of the first entry listing `mime` (case-insensitive).
    pub fn extension_for(&self, mime: &str) -> Option<&str> {
        let mime = mime.trim().to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(_, mimes)| mimes.iter().any(|m| *m == mime))
            .map(|(ext, _)| ext.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extension implied by a file name: text after the last '.', if any.
pub fn extension_from_name(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(i) if i + 1 < base.len() => Some(&base[i + 1..]),
        _ => None,
    }
}
