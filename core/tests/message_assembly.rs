/*
 * message_assembly.rs
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

//! End-to-end assembly of raw messages into `Email` values.

use postino_core::mime::MimeParseError;
use postino_core::MessageAssembler;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn assemble(raw: &[u8]) -> postino_core::Email {
    MessageAssembler::default().assemble(raw, 1).unwrap()
}

#[test]
fn multipart_with_pdf_attachment() {
    let plain = "Quarterly figures attached.\r\nRegards";
    let raw = format!(
        "From: Finance <finance@example.com>\r\n\
To: board@example.com\r\n\
Subject: Q3 report\r\n\
Message-ID: <q3@example.com>\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"B\"\r\n\
\r\n\
This is a multi-part message in MIME format.\r\n\
--B\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
{}\r\n\
--B\r\n\
Content-Type: application/pdf; name=\"x.pdf\"\r\n\
Content-Disposition: attachment; filename=\"x.pdf\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
JVBERi0xLjQK\r\n\
--B--\r\n",
        plain
    );
    let email = assemble(raw.as_bytes());
    assert_eq!(email.body_part("text/plain"), Some(plain.as_bytes()));
    assert_eq!(email.attachments().len(), 1);
    let pdf = &email.attachments()[0];
    assert_eq!(pdf.file_extension(), Some("pdf"));
    assert_eq!(pdf.mime(), "application/pdf");
    assert_eq!(pdf.name(), "x.pdf");
    assert_eq!(pdf.content(), b"%PDF-1.4\n");
    assert_eq!(email.id(), "<q3@example.com>");
    assert_eq!(email.text_html(), plain);
}

#[test]
fn no_content_type_is_single_plain_part() {
    let raw = b"Subject: plain\r\n\r\nline 1\r\nline 2\r\n";
    let email = assemble(raw);
    assert_eq!(email.body_part("text/plain"), Some(&b"line 1\r\nline 2\r\n"[..]));
    assert_eq!(email.body().len(), 1);
    assert!(email.attachments().is_empty());
}

#[test]
fn empty_subject_gets_placeholder() {
    let email = assemble(b"Subject: \r\nFrom: a@b.c\r\n\r\nbody");
    assert_eq!(email.subject(), "(no subject)");
    assert_eq!(email.topic(), "(no subject)");
    let email = assemble(b"From: a@b.c\r\n\r\nbody");
    assert_eq!(email.subject(), "(no subject)");
}

#[test]
fn missing_message_id_is_synthesized_per_assembly() {
    let raw = b"Subject: x\r\n\r\nbody";
    let a = assemble(raw);
    let b = assemble(raw);
    assert!(a.id().starts_with("no-id-"));
    assert!(a.id().len() > "no-id-".len());
    assert_ne!(a.id(), b.id());
}

#[test]
fn application_zip_without_name_is_attachment() {
    let raw = b"Content-Type: multipart/mixed; boundary=\"zz\"\r\n\r\n\
--zz\r\n\
Content-Type: application/zip\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
UEsDBA==\r\n\
--zz--\r\n";
    let email = assemble(raw);
    assert!(email.body().is_empty());
    let zip = &email.attachments()[0];
    assert_eq!(zip.mime(), "application/zip");
    assert_eq!(zip.name(), "attach_0");
    assert_eq!(zip.file_extension(), Some("zip"));
    assert_eq!(zip.content(), b"PK\x03\x04");
    assert_eq!(zip.id().len(), 40);
}

#[test]
fn folded_headers_are_unfolded() {
    let raw = b"Subject: a long\r\n  folded subject\r\n\
To: one@example.com,\r\n\ttwo@example.com\r\n\
Thread-Topic: planning\r\n\
\r\n\
body";
    let email = assemble(raw);
    assert_eq!(email.subject(), "a long folded subject");
    assert_eq!(email.to().len(), 2);
    assert_eq!(email.to()[1].address(), "two@example.com");
    assert_eq!(email.topic(), "planning");
    assert!(email.headers().iter().all(|(_, v)| v.values().iter().all(|s| !s.contains('\n'))));
}

#[test]
fn alternative_html_and_latin1_text() {
    let raw = b"Subject: =?ISO-8859-1?Q?caf=E9?=\r\n\
Content-Type: multipart/alternative; boundary=alt\r\n\
\r\n\
--alt\r\n\
Content-Type: text/plain; charset=\"iso-8859-1\"\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
\r\n\
Caf=E9 ouvert\r\n\
--alt\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<p>Caf\xc3\xa9</p>\r\n\
--alt--\r\n";
    let email = assemble(raw);
    assert_eq!(email.subject(), "café");
    assert_eq!(email.text_plain(), "Café ouvert");
    assert_eq!(email.text_html(), "<p>Café</p>");
}

#[test]
fn unusable_input_is_malformed() {
    let a = MessageAssembler::default();
    assert_eq!(a.assemble(b"", 3).unwrap_err(), MimeParseError::Empty);
    assert_eq!(a.assemble(b"\r\n\r\n", 3).unwrap_err(), MimeParseError::Empty);
    assert_eq!(
        a.assemble(b"garbage line\r\n\r\nbody", 3).unwrap_err(),
        MimeParseError::NoHeaders
    );
}

const SEED_MESSAGE: &[u8] = b"From: =?UTF-8?Q?Ann?= <ann@example.com>\r\n\
Subject: =?UTF-8?B?SGk=?=\r\n\
Content-Type: multipart/mixed; boundary=\"B\"\r\n\
\r\n\
--B\r\n\
Content-Type: text/plain; charset=iso-8859-1\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
\r\n\
caf=E9\r\n\
--B\r\n\
Content-Type: application/pdf; name=\"x.pdf\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
JVBERi0=\r\n\
--B--\r\n";

const FRAGMENTS: &[&[u8]] = &[
    b"=?UTF-8?B?",
    b"=?x?q?=",
    b"=?",
    b"--B",
    b"--B--",
    b"\r",
    b"\n\r\n",
    b"\xff\xfe\xc3",
    b"Content-Type: multipart/mixed; boundary=",
    b"Content-Transfer-Encoding: base64\r\n",
    b"charset=\"ISO-2022-JP\"",
    b"=E",
    b": ",
];

fn mutate(rng: &mut StdRng, input: &mut Vec<u8>) {
    match rng.gen_range(0..4) {
        0 if !input.is_empty() => {
            let i = rng.gen_range(0..input.len());
            input[i] = rng.gen();
        }
        1 => {
            let i = rng.gen_range(0..=input.len());
            let fragment = FRAGMENTS[rng.gen_range(0..FRAGMENTS.len())];
            input.splice(i..i, fragment.iter().copied());
        }
        2 if !input.is_empty() => {
            let i = rng.gen_range(0..input.len());
            input.truncate(i);
        }
        _ => {
            let i = rng.gen_range(0..=input.len());
            let end = rng.gen_range(i..=input.len());
            input.drain(i..end);
        }
    }
}

#[test]
fn arbitrary_bytes_never_panic() {
    let assembler = MessageAssembler::default();
    let mut rng = StdRng::seed_from_u64(0x0b0e_5eed);
    for round in 0..2000u32 {
        let input: Vec<u8> = if round % 4 == 0 {
            let len = rng.gen_range(0..512);
            (0..len).map(|_| rng.gen()).collect()
        } else {
            let mut input = SEED_MESSAGE.to_vec();
            for _ in 0..rng.gen_range(1..8) {
                mutate(&mut rng, &mut input);
            }
            input
        };
        match assembler.assemble(&input, round) {
            Ok(email) => {
                assert_eq!(email.sequence_number(), round);
                assert!(!email.subject().is_empty());
                assert_eq!(email.mailbox(), "INBOX");
            }
            Err(e) => assert!(matches!(e, MimeParseError::Empty | MimeParseError::NoHeaders)),
        }
    }
}
