//! Signing identity.
//!
//! An [`Identity`] holds an owner key and an ephemeral key the owner has
//! delegated to until an expiration date. Payloads are signed with the
//! ephemeral key and returned as a full [`AuthChain`] that a content server
//! can verify back to the owner address.
//!
//! Keys are Ed25519, loaded from 32-byte hex seeds.
//!
//! # Example
//!
//! ```ignore
//! let identity = Identity::from_seed_hex(&seed, Utc::now() + Duration::days(30))?;
//! let chain = identity.sign_payload(&entity_id);
//! verify_auth_chain(&chain, &entity_id, Utc::now())?;
//! ```

mod chain;

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub use chain::{
    address_of, ephemeral_payload, verify_auth_chain, AuthChain, AuthLink, AuthLinkType,
    EPHEMERAL_HEADER,
};

/// Lifetime of an ephemeral delegation created from a key file.
pub const DEFAULT_EPHEMERAL_TTL_DAYS: i64 = 30;

/// Errors that can occur while loading identities or checking chains.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// I/O error reading a key file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key material could not be decoded.
    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },

    /// Loaded key does not belong to the configured address.
    #[error("key address {actual} does not match configured address {expected}")]
    AddressMismatch { expected: String, actual: String },

    /// Ephemeral delegation is no longer valid.
    #[error("identity expired at {expiration}")]
    Expired { expiration: DateTime<Utc> },

    /// Auth chain is malformed or does not verify.
    #[error("invalid auth chain: {reason}")]
    InvalidChain { reason: String },
}

/// Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

pub(crate) fn decode_hex_array<const N: usize>(input: &str, field: &str) -> IdentityResult<[u8; N]> {
    let bytes = hex::decode(input.trim()).map_err(|_| IdentityError::InvalidKey {
        reason: format!("{field} must be valid hex"),
    })?;
    bytes.try_into().map_err(|_| IdentityError::InvalidKey {
        reason: format!("{field} must be {N}-byte hex"),
    })
}

/// An owner key with a delegated ephemeral key.
#[derive(Clone)]
pub struct Identity {
    address: String,
    ephemeral: SigningKey,
    expiration: DateTime<Utc>,
    auth_chain: AuthChain,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

impl Identity {
    /// Delegates from `owner` to `ephemeral` until `expiration`.
    pub fn new(owner: &SigningKey, ephemeral: SigningKey, expiration: DateTime<Utc>) -> Self {
        let address = address_of(&owner.verifying_key());
        let ephemeral_address = address_of(&ephemeral.verifying_key());
        let payload = ephemeral_payload(&ephemeral_address, expiration);
        let signature = owner.sign(payload.as_bytes());

        let auth_chain = vec![
            AuthLink::new(AuthLinkType::Signer, address.clone(), ""),
            AuthLink::new(
                AuthLinkType::EcdsaEphemeral,
                payload,
                format!("0x{}", hex::encode(signature.to_bytes())),
            ),
        ];

        Self {
            address,
            ephemeral,
            expiration,
            auth_chain,
        }
    }

    /// Builds an identity from a hex owner seed.
    ///
    /// The ephemeral key is derived from the owner seed, so the same seed and
    /// expiration always give the same identity.
    pub fn from_seed_hex(seed_hex: &str, expiration: DateTime<Utc>) -> IdentityResult<Self> {
        let seed = decode_hex_array::<32>(seed_hex, "owner seed")?;
        let owner = SigningKey::from_bytes(&seed);

        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(b"ephemeral");
        let mut ephemeral_seed = [0u8; 32];
        ephemeral_seed.copy_from_slice(&hasher.finalize());
        let ephemeral = SigningKey::from_bytes(&ephemeral_seed);

        Ok(Self::new(&owner, ephemeral, expiration))
    }

    /// Loads an identity from a file holding a hex seed.
    ///
    /// When `expected_address` is set, the loaded key must match it.
    pub fn load(path: &Path, expected_address: Option<&str>) -> IdentityResult<Self> {
        let seed = std::fs::read_to_string(path)?;
        let expiration = Utc::now() + Duration::days(DEFAULT_EPHEMERAL_TTL_DAYS);
        let identity = Self::from_seed_hex(&seed, expiration)?;

        if let Some(expected) = expected_address.filter(|a| !a.is_empty()) {
            if !expected.eq_ignore_ascii_case(&identity.address) {
                return Err(IdentityError::AddressMismatch {
                    expected: expected.to_string(),
                    actual: identity.address,
                });
            }
        }

        Ok(identity)
    }

    /// Owner address.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    /// Signs `payload` with the ephemeral key and returns the full chain.
    pub fn sign_payload(&self, payload: &str) -> AuthChain {
        let signature = self.ephemeral.sign(payload.as_bytes());
        let mut chain = self.auth_chain.clone();
        chain.push(AuthLink::new(
            AuthLinkType::EcdsaSignedEntity,
            payload,
            format!("0x{}", hex::encode(signature.to_bytes())),
        ));
        chain
    }
}

/// Source of the signing identity for deployments.
pub trait IdentityProvider: Send + Sync {
    /// Current identity, if the user has one.
    fn identity(&self) -> Option<Identity>;
}

/// Identity provider backed by a fixed, optional identity.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    identity: Option<Identity>,
}

impl StaticIdentityProvider {
    pub fn new(identity: Option<Identity>) -> Self {
        Self { identity }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn identity(&self) -> Option<Identity> {
        self.identity.clone()
    }
}
