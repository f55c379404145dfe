//! Anonymous per-browser identity backed by a signed cookie pair.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Cookie carrying the raw user id.
pub const USER_ID_COOKIE: &str = "UserID";

/// Cookie carrying the lowercase hex HMAC-SHA256 of the user id.
pub const USER_SIGNATURE_COOKIE: &str = "UserSigned";

const SECRET_KEY_LEN: usize = 16;

/// Process-wide signing key.
///
/// Generated once at startup and kept for the lifetime of the process;
/// identities signed under a previous key are reissued.
#[derive(Clone)]
pub struct SecretKey([u8; SECRET_KEY_LEN]);

impl SecretKey {
    /// Draws a fresh key from the operating system RNG.
    ///
    /// # Errors
    ///
    /// Returns the RNG error if the system source is unavailable.
    pub fn generate() -> Result<Self, getrandom::Error> {
        let mut bytes = [0u8; SECRET_KEY_LEN];
        getrandom::fill(&mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self(bytes)
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

/// A resolved anonymous identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    /// Lowercase hex HMAC-SHA256 of `user_id`.
    pub signature: String,
    /// `true` when the incoming pair was missing or invalid and a new one was
    /// minted; the caller must then send [`Identity::cookies`].
    pub issued: bool,
}

impl Identity {
    /// `Set-Cookie` values for the identity pair, both scoped to `/`.
    pub fn cookies(&self) -> [String; 2] {
        [
            format!("{USER_ID_COOKIE}={}; Path=/", self.user_id),
            format!("{USER_SIGNATURE_COOKIE}={}; Path=/", self.signature),
        ]
    }
}

/// Issues and verifies anonymous user identities.
///
/// Not authentication: the service only guarantees that a browser keeps the
/// same opaque id across requests and that ids cannot be forged without the
/// secret key.
pub struct IdentityService {
    key: SecretKey,
}

impl IdentityService {
    pub fn new(key: SecretKey) -> Self {
        Self { key }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(self.key.as_bytes()).expect("HMAC accepts any key length")
    }

    /// Signs `user_id`, returning a 64-character lowercase hex MAC.
    pub fn sign(&self, user_id: &str) -> String {
        let mut mac = self.mac();
        mac.update(user_id.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Checks `signature` against `user_id` in constant time.
    ///
    /// Only the lowercase hex form produced by [`sign`](Self::sign) is
    /// accepted.
    pub fn verify(&self, user_id: &str, signature: &str) -> bool {
        if signature.bytes().any(|b| b.is_ascii_uppercase()) {
            return false;
        }

        let Ok(expected) = hex::decode(signature) else {
            return false;
        };

        let mut mac = self.mac();
        mac.update(user_id.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    /// Mints a new user id and signs it.
    pub fn issue(&self) -> Identity {
        let user_id = Uuid::new_v4().to_string();
        let signature = self.sign(&user_id);
        debug!(%user_id, "Issued anonymous identity");

        Identity {
            user_id,
            signature,
            issued: true,
        }
    }

    /// Trusts the presented pair if it verifies, otherwise issues a new one.
    pub fn resolve(&self, user_id: Option<&str>, signature: Option<&str>) -> Identity {
        match (user_id, signature) {
            (Some(user_id), Some(signature))
                if !user_id.is_empty() && self.verify(user_id, signature) =>
            {
                Identity {
                    user_id: user_id.to_string(),
                    signature: signature.to_string(),
                    issued: false,
                }
            }
            _ => self.issue(),
        }
    }

    /// Resolves the identity from a raw `Cookie` request header.
    pub fn resolve_cookie_header(&self, header: Option<&str>) -> Identity {
        let header = header.unwrap_or_default();
        self.resolve(
            cookie_value(header, USER_ID_COOKIE),
            cookie_value(header, USER_SIGNATURE_COOKIE),
        )
    }
}

/// Finds `name` in a `Cookie` header of the form `a=1; b=2`.
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|cookie| {
        let mut parts = cookie.trim().splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(key), Some(value)) if key == name => Some(value),
            _ => None,
        }
    })
}
