//! Time-based one-time password confirmation (RFC 6238).
//!
//! Each user has a shared base32 secret. The challenge prompt is fixed; the
//! reply must be the current 6-digit code, with one time step of skew
//! allowed either way.

use super::{Challenge, ConfirmGate};
use crate::config::defaults::{default_totp_period, default_totp_prompt};
use crate::error::{BindError, TriggerError};
use crate::protocol::{Request, Response};
use crate::triggers::{Trigger, parse_options};
use chrono::{DateTime, Utc};
use ring::hmac;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use zeroize::Zeroizing;

pub const TOTP_DRIVER: &str = "gogap-confirm-totp";

const DIGITS_MODULUS: u32 = 1_000_000;
const SKEW: i64 = 1;

#[derive(Debug, Deserialize)]
struct UserSecret {
    user: String,
    secret: String,
}

#[derive(Debug, Deserialize)]
struct TotpOptions {
    #[serde(default = "default_totp_prompt")]
    prompt: String,
    #[serde(default = "default_totp_period")]
    period: u64,
    #[serde(default)]
    secrets: BTreeMap<String, UserSecret>,
}

/// Challenge answered with the user's current one-time password.
pub struct TotpCode {
    prompt: String,
    period: u64,
    secrets: HashMap<String, Zeroizing<Vec<u8>>>,
}

impl TotpCode {
    /// Create a challenge from raw (already decoded) per-user secrets.
    pub fn new(
        prompt: impl Into<String>,
        period: u64,
        secrets: impl IntoIterator<Item = (String, Vec<u8>)>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            period: period.max(1),
            secrets: secrets
                .into_iter()
                .map(|(user, key)| (user, Zeroizing::new(key)))
                .collect(),
        }
    }
}

impl Challenge for TotpCode {
    type Expected = ();

    fn issue(&self, req: &Request, resp: &mut Response) -> Result<(), TriggerError> {
        if !self.secrets.contains_key(&req.user_name) {
            return Err(TriggerError::UserSecretNotConfigured(req.user_name.clone()));
        }
        resp.text = self.prompt.clone();
        Ok(())
    }

    fn verify(&self, user: &str, _expected: &(), code: u32, now: DateTime<Utc>) -> bool {
        match self.secrets.get(user) {
            Some(secret) => verify_totp(secret, code, now.timestamp(), self.period),
            None => false,
        }
    }

    fn mismatch(&self) -> TriggerError {
        TriggerError::BadOneTimePassword
    }
}

/// TOTP confirmation trigger.
pub type TotpConfirm = ConfirmGate<TotpCode>;

impl ConfirmGate<TotpCode> {
    pub fn build(_word: &str, options: &toml::Table) -> Result<Arc<dyn Trigger>, BindError> {
        let opts: TotpOptions = parse_options(TOTP_DRIVER, options)?;
        let mut secrets = Vec::with_capacity(opts.secrets.len());
        for entry in opts.secrets.into_values() {
            let key = decode_base32(&entry.secret)
                .ok_or_else(|| BindError::InvalidSecret(entry.user.clone()))?;
            secrets.push((entry.user, key));
        }
        let period = opts.period.max(1);
        Ok(Arc::new(Self::new(
            TotpCode::new(opts.prompt, period, secrets),
            Duration::from_secs(period),
        )))
    }
}

/// Compute the 6-digit HOTP value for `counter` (RFC 4226, HMAC-SHA1).
pub fn totp_code(secret: &[u8], counter: u64) -> u32 {
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, secret);
    let tag = hmac::sign(&key, &counter.to_be_bytes());
    let digest = tag.as_ref();

    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    binary % DIGITS_MODULUS
}

/// Check `code` against the steps around `unix_secs`.
pub fn verify_totp(secret: &[u8], code: u32, unix_secs: i64, period: u64) -> bool {
    if unix_secs < 0 || code >= DIGITS_MODULUS {
        return false;
    }
    let step = (unix_secs as u64 / period.max(1)) as i64;
    (-SKEW..=SKEW)
        .filter_map(|delta| u64::try_from(step + delta).ok())
        .any(|counter| totp_code(secret, counter) == code)
}

/// Decode RFC 4648 base32, ignoring case, padding and spaces.
fn decode_base32(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u64 = 0;
    let mut bits = 0u32;

    for c in input.chars() {
        let value = match c.to_ascii_uppercase() {
            c @ 'A'..='Z' => c as u64 - 'A' as u64,
            c @ '2'..='7' => c as u64 - '2' as u64 + 26,
            '=' | ' ' => continue,
            _ => return None,
        };
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    if out.is_empty() { None } else { Some(out) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::Outcome;

    const RFC_SECRET: &[u8] = b"12345678901234567890";
    const RFC_SECRET_B32: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn gate() -> TotpConfirm {
        TotpConfirm::new(
            TotpCode::new("otp", 30, [("zeal".to_string(), RFC_SECRET.to_vec())]),
            Duration::from_secs(30),
        )
    }

    #[test]
    fn test_base32_decode() {
        assert_eq!(decode_base32(RFC_SECRET_B32).unwrap(), RFC_SECRET);
        assert_eq!(decode_base32("gezdgnbv gy3tqojq").unwrap(), b"1234567890");
        assert_eq!(decode_base32("MY======").unwrap(), b"f");
        assert!(decode_base32("not base32!").is_none());
        assert!(decode_base32("").is_none());
    }

    #[test]
    fn test_rfc6238_vectors() {
        assert_eq!(totp_code(RFC_SECRET, 59 / 30), 287_082);
        assert_eq!(totp_code(RFC_SECRET, 1_111_111_109 / 30), 81_804);
        assert_eq!(totp_code(RFC_SECRET, 1_234_567_890 / 30), 5_924);
    }

    #[test]
    fn test_verify_allows_one_step_skew() {
        assert!(verify_totp(RFC_SECRET, 287_082, 59, 30));
        assert!(verify_totp(RFC_SECRET, 287_082, 89, 30));
        assert!(!verify_totp(RFC_SECRET, 287_082, 150, 30));
        assert!(!verify_totp(RFC_SECRET, 1_287_082, 59, 30));
    }

    #[test]
    fn test_unknown_user_is_rejected_at_issue() {
        let req = Request::new("!x", "!x", "stranger");
        let result = gate().handle_at(&req, &mut Response::default(), at(59));
        assert!(matches!(result, Err(TriggerError::UserSecretNotConfigured(u)) if u == "stranger"));
    }

    #[test]
    fn test_challenge_then_code() {
        let gate = gate();
        let original = Request::new("!x", "!x reboot", "zeal");
        let mut resp = Response::default();
        assert_eq!(gate.handle_at(&original, &mut resp, at(40)).unwrap(), Outcome::Break);
        assert_eq!(resp.text, "otp");

        let reply = Request::new("!x", "!x 287082", "zeal");
        let outcome = gate.handle_at(&reply, &mut Response::default(), at(59)).unwrap();
        assert_eq!(outcome, Outcome::Replay(original));
    }

    #[test]
    fn test_wrong_code() {
        let gate = gate();
        gate.handle_at(&Request::new("!x", "!x", "zeal"), &mut Response::default(), at(40))
            .unwrap();
        let reply = Request::new("!x", "!x 123456", "zeal");
        let result = gate.handle_at(&reply, &mut Response::default(), at(59));
        assert!(matches!(result, Err(TriggerError::BadOneTimePassword)));
    }

    #[test]
    fn test_build_rejects_bad_secret() {
        let options: toml::Table = toml::from_str(
            r#"
[secrets.zeal]
user = "zeal"
secret = "0000"
"#,
        )
        .unwrap();
        assert!(matches!(
            TotpConfirm::build("!x", &options),
            Err(BindError::InvalidSecret(u)) if u == "zeal"
        ));

        let options: toml::Table = toml::from_str(&format!(
            "period = 30\n[secrets.zeal]\nuser = \"zeal\"\nsecret = \"{RFC_SECRET_B32}\"\n"
        ))
        .unwrap();
        assert!(TotpConfirm::build("!x", &options).is_ok());
    }
}
