//! Slack request signing (v0): HMAC-SHA256 over `v0:{timestamp}:{body}`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::SignatureError;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

/// Requests older (or newer) than this are treated as replays.
pub const MAX_CLOCK_SKEW_SECS: i64 = 60 * 5;

const VERSION: &str = "v0";

/// Verify a Slack request signature.
///
/// `timestamp` and `signature` are the raw header values, `now` is the
/// current unix time in seconds.
pub fn verify(
    signing_secret: &[u8],
    timestamp: &str,
    signature: &str,
    body: &[u8],
    now: i64,
) -> Result<(), SignatureError> {
    let ts: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| SignatureError::MalformedHeader {
            header: TIMESTAMP_HEADER,
            reason: "not an integer".into(),
        })?;

    if now.abs_diff(ts) > MAX_CLOCK_SKEW_SECS.unsigned_abs() {
        return Err(SignatureError::Stale {
            timestamp: ts,
            window_secs: MAX_CLOCK_SKEW_SECS,
        });
    }

    let sig_hex = signature
        .strip_prefix("v0=")
        .ok_or_else(|| SignatureError::MalformedHeader {
            header: SIGNATURE_HEADER,
            reason: "missing v0= prefix".into(),
        })?;
    let expected = hex::decode(sig_hex).map_err(|_| SignatureError::MalformedHeader {
        header: SIGNATURE_HEADER,
        reason: "not valid hex".into(),
    })?;

    let mac = mac_for(signing_secret, timestamp.trim(), body)?;
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

/// Compute the `v0=<hex>` signature for a body. Used to sign test requests.
pub fn sign(signing_secret: &[u8], timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
    let mac = mac_for(signing_secret, timestamp, body)?;
    Ok(format!(
        "{VERSION}={}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

fn mac_for(signing_secret: &[u8], timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(signing_secret).map_err(|_| {
        SignatureError::MalformedHeader {
            header: SIGNATURE_HEADER,
            reason: "invalid signing key".into(),
        }
    })?;
    mac.update(VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Example from Slack's "Verifying requests from Slack" guide.
    const SECRET: &[u8] = b"8f742231b10e8888abcd99yyyzzz85a5";
    const TIMESTAMP: &str = "1531420618";
    const BODY: &[u8] = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";
    const SIGNATURE: &str = "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503";

    const NOW: i64 = 1_531_420_618 + 10;

    #[test]
    fn accepts_documented_example() {
        assert!(verify(SECRET, TIMESTAMP, SIGNATURE, BODY, NOW).is_ok());
    }

    #[test]
    fn sign_matches_documented_example() {
        assert_eq!(sign(SECRET, TIMESTAMP, BODY).unwrap(), SIGNATURE);
    }

    #[test]
    fn rejects_tampered_body() {
        let mut body = BODY.to_vec();
        body.push(b'x');
        assert!(matches!(
            verify(SECRET, TIMESTAMP, SIGNATURE, &body, NOW),
            Err(SignatureError::Mismatch)
        ));
    }

    #[test]
    fn rejects_wrong_secret() {
        assert!(matches!(
            verify(b"not-the-secret", TIMESTAMP, SIGNATURE, BODY, NOW),
            Err(SignatureError::Mismatch)
        ));
    }

    #[test]
    fn rejects_stale_timestamp() {
        let later = 1_531_420_618 + MAX_CLOCK_SKEW_SECS + 1;
        assert!(matches!(
            verify(SECRET, TIMESTAMP, SIGNATURE, BODY, later),
            Err(SignatureError::Stale { .. })
        ));
    }

    #[test]
    fn rejects_extreme_timestamp() {
        for ts in [i64::MIN.to_string(), i64::MAX.to_string()] {
            assert!(matches!(
                verify(SECRET, &ts, SIGNATURE, BODY, NOW),
                Err(SignatureError::Stale { .. })
            ));
        }
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(matches!(
            verify(SECRET, "yesterday", SIGNATURE, BODY, NOW),
            Err(SignatureError::MalformedHeader { header: TIMESTAMP_HEADER, .. })
        ));
        assert!(matches!(
            verify(SECRET, TIMESTAMP, "a2114d57", BODY, NOW),
            Err(SignatureError::MalformedHeader { header: SIGNATURE_HEADER, .. })
        ));
        assert!(matches!(
            verify(SECRET, TIMESTAMP, "v0=zz", BODY, NOW),
            Err(SignatureError::MalformedHeader { header: SIGNATURE_HEADER, .. })
        ));
    }
}
