//! Anti-forgery nonces and the capability check gating every save.
//!
//! The gate is deliberately silent: a failed check makes the save a no-op
//! with nothing written and no error surfaced, which keeps a forged or
//! stale submission indistinguishable from "nothing changed".

use crate::html::esc_attr;
use crate::metabox::MetaBox;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde_json::Value;
use sha2::Sha256;
use std::collections::HashSet;

pub trait SecurityProvider {
    /// Issues an anti-forgery nonce bound to an action.
    fn issue_nonce(&self, action: &str) -> String;
    /// Checks a submitted nonce against an action.
    fn verify_nonce(&self, nonce: &str, action: &str) -> bool;
    /// Checks whether the acting principal holds a capability for a record.
    fn can(&self, capability: &str, record_id: &str) -> bool;
}

/// Accepts everything. Test double.
pub struct PermissiveSecurity;

impl SecurityProvider for PermissiveSecurity {
    fn issue_nonce(&self, action: &str) -> String {
        format!("open-nonce-{}", action.len())
    }
    fn verify_nonce(&self, _nonce: &str, _action: &str) -> bool {
        true
    }
    fn can(&self, _capability: &str, _record_id: &str) -> bool {
        true
    }
}

/// Rejects everything. Test double.
pub struct DenySecurity;

impl SecurityProvider for DenySecurity {
    fn issue_nonce(&self, _action: &str) -> String {
        String::new()
    }
    fn verify_nonce(&self, _nonce: &str, _action: &str) -> bool {
        false
    }
    fn can(&self, _capability: &str, _record_id: &str) -> bool {
        false
    }
}

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 10;
const DEFAULT_NONCE_LIFETIME_SECS: i64 = 86_400;

/// Windowed HMAC nonces plus a capability grant set.
///
/// A nonce is the first ten hex characters of
/// `HMAC-SHA256(secret, action | principal | tick)` where the tick advances
/// every half lifetime; verification accepts the current and the previous
/// tick, so an issued nonce stays valid for one half to one full lifetime.
pub struct HmacSecurity {
    secret: Vec<u8>,
    principal: String,
    capabilities: HashSet<String>,
    lifetime_secs: i64,
}

impl HmacSecurity {
    pub fn new(secret: Vec<u8>, principal: impl Into<String>) -> Self {
        Self {
            secret,
            principal: principal.into(),
            capabilities: HashSet::new(),
            lifetime_secs: DEFAULT_NONCE_LIFETIME_SECS,
        }
    }

    pub fn from_base64_secret(encoded: &str, principal: impl Into<String>) -> anyhow::Result<Self> {
        let secret = general_purpose::STANDARD.decode(encoded)?;
        Ok(Self::new(secret, principal))
    }

    /// Generates a fresh base64 secret suitable for
    /// [`Self::from_base64_secret`].
    pub fn generate_secret() -> String {
        let mut key_bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut key_bytes);
        general_purpose::STANDARD.encode(key_bytes)
    }

    pub fn grant(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    pub fn with_lifetime(mut self, lifetime_secs: i64) -> Self {
        self.lifetime_secs = lifetime_secs.max(2);
        self
    }

    fn tick(&self, offset: i64) -> i64 {
        Utc::now().timestamp() / (self.lifetime_secs / 2) - offset
    }

    fn hash(&self, action: &str, tick: i64) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size");
        mac.update(format!("{}|{}|{}", action, self.principal, tick).as_bytes());
        let digest = hex::encode(mac.finalize().into_bytes());
        digest[..NONCE_LEN].to_string()
    }
}

impl SecurityProvider for HmacSecurity {
    fn issue_nonce(&self, action: &str) -> String {
        self.hash(action, self.tick(0))
    }

    fn verify_nonce(&self, nonce: &str, action: &str) -> bool {
        nonce == self.hash(action, self.tick(0)) || nonce == self.hash(action, self.tick(1))
    }

    fn can(&self, capability: &str, _record_id: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Renders the hidden nonce input every meta-box form carries.
pub fn nonce_field<S: SecurityProvider>(metabox: &MetaBox, security: &S) -> String {
    let nonce = security.issue_nonce(&metabox.action_key());
    format!(
        "<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
        esc_attr(&metabox.nonce_key()),
        esc_attr(&nonce),
    )
}

/// The gate itself: the submitted nonce must verify for the meta box's
/// action and the principal must hold its capability. Returns false on any
/// missing piece; callers treat false as "do nothing".
pub fn check_security<S: SecurityProvider>(
    metabox: &MetaBox,
    submission: &Value,
    record_id: &str,
    security: &S,
) -> bool {
    let Some(nonce) = submission.get(metabox.nonce_key()).and_then(Value::as_str) else {
        log::debug!("meta box '{}': submission carries no nonce", metabox.id);
        return false;
    };
    if !security.verify_nonce(nonce, &metabox.action_key()) {
        log::debug!("meta box '{}': nonce rejected", metabox.id);
        return false;
    }
    if !security.can(metabox.capability(), record_id) {
        log::debug!(
            "meta box '{}': capability '{}' denied for record '{}'",
            metabox.id,
            metabox.capability(),
            record_id
        );
        return false;
    }
    true
}
