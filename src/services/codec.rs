//! Byte representation of a stored page.
//!
//! Records are JSON objects holding the title and the body. A body that is
//! valid UTF-8 is stored as a JSON string; any other body is stored as an
//! array of byte values. The instance tag belongs to a single response and
//! is never part of a record.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::WikiError;
use crate::types::{Page, Title};

#[derive(Serialize)]
#[serde(untagged)]
enum BodyRef<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> BodyRef<'a> {
    fn new(body: &'a [u8]) -> Self {
        match std::str::from_utf8(body) {
            Ok(text) => BodyRef::Text(text),
            Err(_) => BodyRef::Bytes(body),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Body {
    Text(String),
    Bytes(Vec<u8>),
}

impl Default for Body {
    fn default() -> Self {
        Body::Bytes(Vec::new())
    }
}

impl From<Body> for Vec<u8> {
    fn from(body: Body) -> Self {
        match body {
            Body::Text(text) => text.into_bytes(),
            Body::Bytes(bytes) => bytes,
        }
    }
}

#[derive(Serialize)]
struct RecordRef<'a> {
    title: &'a str,
    body: BodyRef<'a>,
}

#[derive(Deserialize)]
struct Record {
    title: String,
    #[serde(default)]
    body: Body,
}

/// Encode the persisted fields of `page`
pub fn encode(page: &Page) -> Result<Vec<u8>, WikiError> {
    let record = RecordRef {
        title: page.title().as_str(),
        body: BodyRef::new(page.body()),
    };
    let bytes = serde_json::to_vec(&record)?;
    debug!("Encoded page '{}' into {} bytes", page.title(), bytes.len());
    Ok(bytes)
}

/// Decode a record produced by [`encode`]
pub fn decode(bytes: &[u8]) -> Result<Page, WikiError> {
    let record: Record = serde_json::from_slice(bytes)?;
    let title = Title::parse(&record.title)?;
    Ok(Page::new(title, Vec::from(record.body)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(title: &str, body: &[u8]) -> Page {
        Page::new(Title::parse(title).unwrap(), body)
    }

    #[test]
    fn decode_restores_title_and_body() {
        let cases: [(&str, &[u8]); 3] = [("Alice", b"hello"), ("Empty", b""), ("Bin0", &[0, 159, 255, 10])];
        for (title, body) in cases {
            let original = page(title, body);
            let decoded = decode(&encode(&original).unwrap()).unwrap();
            assert_eq!(decoded.title(), original.title());
            assert_eq!(decoded.body(), original.body());
        }
    }

    #[test]
    fn every_byte_value_survives_under_generated_titles() {
        let alphabet: Vec<char> = ('a'..='z').chain('A'..='Z').chain('0'..='9').collect();
        let all_bytes: Vec<u8> = (0..=255).collect();
        for len in 1..=8 {
            for offset in (0..alphabet.len()).step_by(7) {
                let title: String = (0..len).map(|i| alphabet[(offset + i * 5) % alphabet.len()]).collect();
                for body in [&all_bytes[..], &all_bytes[..len * 17], &all_bytes[200..]] {
                    let original = page(&title, body);
                    let decoded = decode(&encode(&original).unwrap()).unwrap();
                    assert_eq!(decoded.title().as_str(), title);
                    assert_eq!(decoded.body(), body, "title {title}");
                }
            }
        }
    }

    #[test]
    fn text_bodies_are_stored_as_strings() {
        let bytes = encode(&page("Alice", "hello \u{e9}".as_bytes())).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "{\"title\":\"Alice\",\"body\":\"hello \u{e9}\"}");

        let bytes = encode(&page("Bin", &[0xff, 0x00])).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), r#"{"title":"Bin","body":[255,0]}"#);
    }

    #[test]
    fn record_without_body_decodes_empty() {
        let decoded = decode(br#"{"title":"Alice"}"#).unwrap();
        assert!(decoded.body().is_empty());
    }

    #[test]
    fn instance_is_not_encoded() {
        let mut p = page("Alice", b"hello");
        p.stamp_instance("instance-7");
        let bytes = encode(&p).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(!text.contains("instance"));
        assert_eq!(decode(&bytes).unwrap().instance(), "");
    }

    #[test]
    fn garbage_is_a_codec_error() {
        assert!(matches!(decode(b"\x00not json"), Err(WikiError::Codec(_))));
    }

    #[test]
    fn stored_title_must_still_be_valid() {
        let bytes = br#"{"title":"no spaces allowed","body":[]}"#;
        assert!(matches!(decode(bytes), Err(WikiError::InvalidTitle(_))));
    }
}
