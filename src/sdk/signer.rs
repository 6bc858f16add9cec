//! Signing credential handed to the SDK.
//!
//! Accepts a 64 character hex secret key or a bech32 `nsec1...` string
//! whose checksum verifies and whose payload is a 32 byte secret.
//! The secret never appears in `Debug` output or logs.

use std::fmt;

use crate::config::ConfigError;

#[derive(Clone, PartialEq, Eq)]
pub struct SignerCredential(String);

const SECRET_KEY_LEN: usize = 32;

impl SignerCredential {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(ConfigError::MissingPrivateKey);
        }

        if key.len() == 64 && key.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Self(key.to_ascii_lowercase()));
        }

        if key.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("nsec1")) {
            let (hrp, payload) = bech32::decode(key).map_err(|e| {
                ConfigError::InvalidPrivateKey(format!("malformed nsec key: {e}"))
            })?;
            let prefix = hrp.to_string();
            if !prefix.eq_ignore_ascii_case("nsec") {
                return Err(ConfigError::InvalidPrivateKey(format!(
                    "expected an nsec key, got prefix '{prefix}'"
                )));
            }
            if payload.len() != SECRET_KEY_LEN {
                return Err(ConfigError::InvalidPrivateKey(format!(
                    "nsec key decodes to {} bytes, expected {SECRET_KEY_LEN}",
                    payload.len()
                )));
            }
            return Ok(Self(key.to_ascii_lowercase()));
        }

        Err(ConfigError::InvalidPrivateKey(
            "expected 64 hex characters or an nsec1 key".into(),
        ))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SignerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignerCredential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "7f3b4c1a9e2d5f6a8b0c1d2e3f4a5b6c7d8e9f0a1b2c3d4e5f6a7b8c9d0e1f2a";

    #[test]
    fn hex_key_is_normalised() {
        let cred = SignerCredential::parse(&format!("  {}  ", HEX.to_uppercase())).unwrap();
        assert_eq!(cred.expose(), HEX);
    }

    // NIP-19 example key, payload 67dea2ed...d92ffa
    const NSEC: &str = "nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5";

    #[test]
    fn nsec_key_is_accepted() {
        let cred = SignerCredential::parse(NSEC).unwrap();
        assert_eq!(cred.expose(), NSEC);
    }

    #[test]
    fn uppercase_nsec_is_normalised() {
        let cred = SignerCredential::parse(&NSEC.to_uppercase()).unwrap();
        assert_eq!(cred.expose(), NSEC);
    }

    #[test]
    fn nsec_with_bad_checksum_is_rejected() {
        // last character flipped
        let typo = format!("{}6", &NSEC[..NSEC.len() - 1]);
        assert!(matches!(
            SignerCredential::parse(&typo),
            Err(ConfigError::InvalidPrivateKey(_))
        ));
        assert!(matches!(
            SignerCredential::parse("nsec1qqqqqq"),
            Err(ConfigError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn nsec_payload_must_be_32_bytes() {
        // valid checksum, 16-byte payload
        let err = SignerCredential::parse("nsec1vl029mgpspedva04g90vltkh6g9z4f4t").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrivateKey(ref m) if m.contains("16 bytes")));
    }

    #[test]
    fn npub_is_not_a_secret() {
        let err = SignerCredential::parse(
            "npub1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqu95glp",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrivateKey(_)));
    }

    #[test]
    fn empty_key_is_missing() {
        assert!(matches!(
            SignerCredential::parse("   "),
            Err(ConfigError::MissingPrivateKey)
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            SignerCredential::parse("not-a-key"),
            Err(ConfigError::InvalidPrivateKey(_))
        ));
        assert!(matches!(
            SignerCredential::parse("nsec1BOGUS!!"),
            Err(ConfigError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn debug_is_redacted() {
        let cred = SignerCredential::parse(HEX).unwrap();
        let dbg = format!("{cred:?}");
        assert!(!dbg.contains(HEX));
        assert!(dbg.contains("redacted"));
    }
}
