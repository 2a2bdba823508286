use kernel::id::Id;

use platform::crypto;

pub struct UserMarker;
pub type UserId = Id<UserMarker>;

/// URL-safe identifier used in password reset links
///
/// Base64url (no padding) of the UUID's string form.
pub fn encode_uid(user_id: &UserId) -> String {
    crypto::to_base64url(user_id.to_string().as_bytes())
}

/// Inverse of [`encode_uid`]; `None` for anything that is not an encoded UUID
pub fn decode_uid(uid: &str) -> Option<UserId> {
    let bytes = crypto::from_base64url(uid.trim()).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_new() {
        let user_id = UserId::new();
        assert_eq!(user_id.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn test_uid_roundtrip() {
        let user_id = UserId::new();
        let uid = encode_uid(&user_id);
        assert!(!uid.contains('='));
        assert_eq!(decode_uid(&uid), Some(user_id));
    }

    #[test]
    fn test_decode_uid_rejects_garbage() {
        assert_eq!(decode_uid("!!!"), None);
        // Valid base64url, not a UUID
        assert_eq!(decode_uid(&crypto::to_base64url(b"42")), None);
    }
}
