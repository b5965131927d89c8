//! Input validation for notekeeper.
//!
//! The service deliberately accepts note bodies as-is. What is validated here
//! are the two values that decide routing outcomes: the id in the path and
//! the identity in the authorization header.

use crate::error::{NoteError, NoteResult};

/// Validate a note id taken from a request path.
///
/// Anything that is not a non-negative integer cannot name a stored note, so
/// it is reported as `NotFound` carrying the raw segment.
pub fn validate_note_id(raw: &str) -> NoteResult<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(NoteError::not_found(raw));
    }
    trimmed.parse::<u64>().map_err(|_| NoteError::not_found(raw))
}

/// Validate the identity carried by an authorization header value.
///
/// Only missing or empty values are `Unauthorized`. The bytes are taken as
/// UTF-8 when they decode as such and as Latin-1 otherwise, so every
/// non-empty value yields an identity.
pub fn validate_identity(header: Option<&[u8]>) -> NoteResult<String> {
    let value = header.ok_or(NoteError::Unauthorized)?;
    if value.is_empty() {
        return Err(NoteError::Unauthorized);
    }
    match std::str::from_utf8(value) {
        Ok(identity) => Ok(identity.to_string()),
        Err(_) => Ok(value.iter().map(|&b| char::from(b)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_note_id_valid() {
        assert_eq!(validate_note_id("1").unwrap(), 1);
        assert_eq!(validate_note_id("007").unwrap(), 7);
        assert_eq!(validate_note_id("999").unwrap(), 999);
    }

    #[test]
    fn test_validate_note_id_rejects_non_numeric() {
        let err = validate_note_id("abc").unwrap_err();
        assert_eq!(err.to_string(), "Die Notiz mit ID abc wurde nicht gefunden.");

        assert!(validate_note_id("-3").is_err());
        assert!(validate_note_id("1.5").is_err());
        assert!(validate_note_id("").is_err());
    }

    #[test]
    fn test_validate_note_id_overflow_is_not_found() {
        let raw = "99999999999999999999999";
        let err = validate_note_id(raw).unwrap_err();
        assert!(matches!(err, NoteError::NotFound(ref id) if id == raw));
    }

    #[test]
    fn test_validate_identity() {
        assert_eq!(validate_identity(Some(b"u1".as_slice())).unwrap(), "u1");
        assert_eq!(
            validate_identity(Some(b"Bearer abc".as_slice())).unwrap(),
            "Bearer abc"
        );
    }

    #[test]
    fn test_validate_identity_rejects_missing_or_empty() {
        assert!(matches!(validate_identity(None), Err(NoteError::Unauthorized)));
        assert!(matches!(validate_identity(Some(b"".as_slice())), Err(NoteError::Unauthorized)));
    }

    #[test]
    fn test_validate_identity_accepts_non_ascii() {
        assert_eq!(
            validate_identity(Some("Jürgen".as_bytes())).unwrap(),
            "Jürgen"
        );
        // not UTF-8: each byte is one Latin-1 character
        assert_eq!(
            validate_identity(Some(b"J\xfcrgen".as_slice())).unwrap(),
            "Jürgen"
        );
        assert_eq!(validate_identity(Some([0xffu8, 0xfe].as_slice())).unwrap(), "ÿþ");
    }
}
