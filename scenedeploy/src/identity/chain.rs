//! Auth chains: ordered, signed delegations from an owner key to a payload.

use std::fmt;

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use super::{decode_hex_array, IdentityError, IdentityResult};

/// First line of the ephemeral delegation payload.
pub const EPHEMERAL_HEADER: &str = "Decentraland Login";

/// Kind of an auth chain link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthLinkType {
    #[serde(rename = "SIGNER")]
    Signer,
    #[serde(rename = "ECDSA_EPHEMERAL")]
    EcdsaEphemeral,
    #[serde(rename = "ECDSA_SIGNED_ENTITY")]
    EcdsaSignedEntity,
}

impl AuthLinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signer => "SIGNER",
            Self::EcdsaEphemeral => "ECDSA_EPHEMERAL",
            Self::EcdsaSignedEntity => "ECDSA_SIGNED_ENTITY",
        }
    }
}

impl fmt::Display for AuthLinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One link of an auth chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthLink {
    #[serde(rename = "type")]
    pub kind: AuthLinkType,
    pub payload: String,
    #[serde(default)]
    pub signature: String,
}

impl AuthLink {
    pub fn new(kind: AuthLinkType, payload: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            kind,
            payload: payload.into(),
            signature: signature.into(),
        }
    }
}

/// An ordered list of links; each link is signed by the key the previous
/// link delegates to.
pub type AuthChain = Vec<AuthLink>;

/// Text the owner signs to delegate to an ephemeral key.
pub fn ephemeral_payload(ephemeral_address: &str, expiration: DateTime<Utc>) -> String {
    format!(
        "{}\nEphemeral address: {}\nExpiration: {}",
        EPHEMERAL_HEADER,
        ephemeral_address,
        expiration.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    )
}

/// Address string of a verifying key.
pub fn address_of(key: &VerifyingKey) -> String {
    format!("0x{}", hex::encode(key.to_bytes()))
}

fn key_from_address(address: &str) -> IdentityResult<VerifyingKey> {
    let raw = address.strip_prefix("0x").unwrap_or(address);
    let bytes = decode_hex_array::<32>(raw, "address")?;
    VerifyingKey::from_bytes(&bytes).map_err(|_| IdentityError::InvalidKey {
        reason: format!("address {} is not a valid public key", address),
    })
}

fn check_signature(key: &VerifyingKey, link: &AuthLink) -> IdentityResult<()> {
    let raw = link.signature.strip_prefix("0x").unwrap_or(&link.signature);
    let bytes = decode_hex_array::<64>(raw, "signature")?;
    let signature = Signature::from_bytes(&bytes);
    key.verify(link.payload.as_bytes(), &signature)
        .map_err(|_| IdentityError::InvalidChain {
            reason: format!("{} signature does not verify", link.kind),
        })
}

fn parse_ephemeral(payload: &str) -> IdentityResult<(String, DateTime<Utc>)> {
    let mut address = None;
    let mut expiration = None;
    for line in payload.lines() {
        if let Some(value) = line.strip_prefix("Ephemeral address: ") {
            address = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Expiration: ") {
            expiration = DateTime::parse_from_rfc3339(value.trim())
                .ok()
                .map(|d| d.with_timezone(&Utc));
        }
    }
    match (address, expiration) {
        (Some(a), Some(e)) => Ok((a, e)),
        _ => Err(IdentityError::InvalidChain {
            reason: "malformed ephemeral payload".to_string(),
        }),
    }
}

/// Verifies a signer → ephemeral → entity chain at time `now`.
///
/// Returns the owner address on success.
pub fn verify_auth_chain(
    chain: &[AuthLink],
    entity_id: &str,
    now: DateTime<Utc>,
) -> IdentityResult<String> {
    let [signer, ephemeral, signed] = chain else {
        return Err(IdentityError::InvalidChain {
            reason: format!("expected 3 links, got {}", chain.len()),
        });
    };

    let expected = [
        AuthLinkType::Signer,
        AuthLinkType::EcdsaEphemeral,
        AuthLinkType::EcdsaSignedEntity,
    ];
    for (link, kind) in chain.iter().zip(expected) {
        if link.kind != kind {
            return Err(IdentityError::InvalidChain {
                reason: format!("expected {} link, got {}", kind, link.kind),
            });
        }
    }

    let owner = key_from_address(&signer.payload)?;
    check_signature(&owner, ephemeral)?;

    let (ephemeral_address, expiration) = parse_ephemeral(&ephemeral.payload)?;
    if expiration <= now {
        return Err(IdentityError::Expired { expiration });
    }

    if signed.payload != entity_id {
        return Err(IdentityError::InvalidChain {
            reason: "signed payload does not match entity id".to_string(),
        });
    }
    let ephemeral_key = key_from_address(&ephemeral_address)?;
    check_signature(&ephemeral_key, signed)?;

    Ok(signer.payload.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_type_serde_names() {
        let link = AuthLink::new(AuthLinkType::EcdsaSignedEntity, "id", "0xsig");
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["type"], "ECDSA_SIGNED_ENTITY");
    }

    #[test]
    fn test_ephemeral_payload_parses_back() {
        let expiration = DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let payload = ephemeral_payload("0xabc", expiration);
        let (address, parsed) = parse_ephemeral(&payload).unwrap();
        assert_eq!(address, "0xabc");
        assert_eq!(parsed, expiration);
    }

    #[test]
    fn test_verify_rejects_short_chain() {
        let chain = vec![AuthLink::new(AuthLinkType::Signer, "0x00", "")];
        assert!(matches!(
            verify_auth_chain(&chain, "id", Utc::now()),
            Err(IdentityError::InvalidChain { .. })
        ));
    }
}
