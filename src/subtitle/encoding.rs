//! Text decoding with ordered encoding fallback.
//!
//! Subtitle files in the wild are not always UTF-8. Decoding tries each
//! configured encoding in order and keeps the first one that decodes the
//! whole input without replacement characters.

use encoding_rs::Encoding;

/// Encodings tried when no list is configured.
pub const DEFAULT_ENCODINGS: &[&str] = &["utf-8", "shift_jis", "windows-1252"];

/// Successfully decoded text and the encoding that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static str,
}

/// Decode `bytes` with the first encoding in `labels` that succeeds.
///
/// A byte order mark, when present, takes precedence over the list.
/// Unknown labels are skipped. Returns `None` when every encoding fails.
pub fn decode_with_fallback<S: AsRef<str>>(bytes: &[u8], labels: &[S]) -> Option<Decoded> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        if let Some(text) =
            encoding.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        {
            return Some(Decoded {
                text: text.into_owned(),
                encoding: encoding.name(),
            });
        }
    }

    for label in labels {
        let label = label.as_ref();
        let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
            tracing::warn!(label, "Unknown subtitle encoding label, skipping");
            continue;
        };
        match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            Some(text) => {
                return Some(Decoded {
                    text: text.into_owned(),
                    encoding: encoding.name(),
                })
            }
            None => tracing::debug!(encoding = encoding.name(), "Decode failed, trying next"),
        }
    }

    None
}
