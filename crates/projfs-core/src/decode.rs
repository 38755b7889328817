//! Best-effort UTF-8 decoding.
//!
//! File contents are arbitrary bytes. Decoding never fails: invalid
//! sequences become U+FFFD and the result records that substitutions
//! happened, so callers can tell clean text from repaired text.

use std::str;

/// Text decoded from raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    /// Decoded text
    pub text: String,
    /// `true` if at least one invalid sequence was replaced
    pub lossy: bool,
}

/// Decodes `bytes` as UTF-8, replacing invalid sequences.
///
/// # Examples
///
/// ```
/// use projfs_core::decode::decode_text;
///
/// let clean = decode_text("héllo".as_bytes());
/// assert_eq!(clean.text, "héllo");
/// assert!(!clean.lossy);
///
/// let repaired = decode_text(b"ok\xFFok");
/// assert_eq!(repaired.text, "ok\u{FFFD}ok");
/// assert!(repaired.lossy);
/// ```
#[must_use]
pub fn decode_text(bytes: &[u8]) -> DecodedText {
    match str::from_utf8(bytes) {
        Ok(text) => DecodedText {
            text: text.to_string(),
            lossy: false,
        },
        Err(_) => DecodedText {
            text: String::from_utf8_lossy(bytes).into_owned(),
            lossy: true,
        },
    }
}

/// Decodes a prefix cut out of a longer byte stream.
///
/// An incomplete multi-byte sequence at the very end was produced by the
/// cut, not by the file, so it is dropped instead of being replaced.
///
/// # Examples
///
/// ```
/// use projfs_core::decode::decode_prefix;
///
/// // "é" is 0xC3 0xA9; cutting after 0xC3 leaves an incomplete sequence.
/// let decoded = decode_prefix(&[b'a', 0xC3]);
/// assert_eq!(decoded.text, "a");
/// assert!(!decoded.lossy);
/// ```
#[must_use]
pub fn decode_prefix(bytes: &[u8]) -> DecodedText {
    decode_text(&bytes[..complete_prefix_len(bytes)])
}

/// Length of `bytes` without a trailing incomplete UTF-8 sequence.
fn complete_prefix_len(bytes: &[u8]) -> usize {
    let mut start = 0;
    loop {
        match str::from_utf8(&bytes[start..]) {
            Ok(_) => return bytes.len(),
            Err(e) => match e.error_len() {
                Some(invalid) => start += e.valid_up_to() + invalid,
                None => return start + e.valid_up_to(),
            },
        }
    }
}
