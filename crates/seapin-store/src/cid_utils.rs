//! CID (Content Identifier) utilities
//!
//! Every object the gateway stores is keyed by a CIDv1 with the `raw` codec and
//! a SHA2-256 multihash, the same identifier `ipfs add --cid-version=1
//! --raw-leaves` produces for a single-chunk file. No other version, codec or
//! hash function is accepted.

use crate::{Result, StoreError};
use cid::{multibase, Cid, Version};
use multihash::Multihash;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Multicodec code for raw binary data
pub const RAW_CODEC: u64 = 0x55;

/// Multihash code for SHA2-256
pub const SHA2_256: u64 = 0x12;

/// Length of a SHA2-256 digest in bytes
pub const DIGEST_LEN: usize = 32;

/// Path prefix under which content is served
pub const GATEWAY_PREFIX: &str = "/ipfs/";

/// A validated CIDv1 / raw / SHA2-256 identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentId(Cid);

impl ContentId {
    /// Hash the full buffer and wrap the digest as a CIDv1 raw identifier.
    ///
    /// Fails only if the multihash envelope cannot be built, which is an
    /// internal fault rather than anything the caller sent.
    pub fn compute(data: &[u8]) -> Result<Self> {
        let digest = Sha256::digest(data);
        let multihash = Multihash::<64>::wrap(SHA2_256, &digest)
            .map_err(|e| StoreError::Encoding(e.to_string()))?;
        Ok(Self(Cid::new_v1(RAW_CODEC, multihash)))
    }

    /// Parse any multibase rendering of a CIDv1 / raw / SHA2-256 identifier.
    ///
    /// The decoded bytes must hold exactly one CID; anything left over after
    /// it is rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let (_, bytes) = multibase::decode(text)
            .map_err(|e| StoreError::InvalidCid(format!("multibase: {e}")))?;
        let mut remaining = bytes.as_slice();
        let cid = Cid::read_bytes(&mut remaining)?;
        if !remaining.is_empty() {
            return Err(StoreError::InvalidCid(format!(
                "{} trailing bytes after CID",
                remaining.len()
            )));
        }
        Self::try_from(cid)
    }

    /// The underlying CID
    pub fn as_cid(&self) -> &Cid {
        &self.0
    }

    /// The 32-byte SHA2-256 digest
    pub fn digest(&self) -> &[u8] {
        self.0.hash().digest()
    }

    /// `/ipfs/<cid>` path the gateway serves this identifier under
    pub fn gateway_path(&self) -> String {
        format!("{}{}", GATEWAY_PREFIX, self)
    }

    /// Check that `data` hashes to this identifier
    pub fn verify(&self, data: &[u8]) -> bool {
        matches!(Self::compute(data), Ok(computed) if computed == *self)
    }
}

impl TryFrom<Cid> for ContentId {
    type Error = StoreError;

    fn try_from(cid: Cid) -> Result<Self> {
        if cid.version() != Version::V1 {
            return Err(StoreError::InvalidCid("only CIDv1 is supported".to_string()));
        }
        if cid.codec() != RAW_CODEC {
            return Err(StoreError::InvalidCid(format!(
                "unsupported codec 0x{:x}, expected raw",
                cid.codec()
            )));
        }
        let hash = cid.hash();
        if hash.code() != SHA2_256 {
            return Err(StoreError::InvalidCid(format!(
                "unsupported hash function 0x{:x}, expected sha2-256",
                hash.code()
            )));
        }
        if hash.digest().len() != DIGEST_LEN {
            return Err(StoreError::InvalidCid(format!(
                "digest is {} bytes, expected {}",
                hash.digest().len(),
                DIGEST_LEN
            )));
        }
        Ok(Self(cid))
    }
}

impl From<ContentId> for Cid {
    fn from(id: ContentId) -> Self {
        id.0
    }
}

impl FromStr for ContentId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Canonical form: multibase base32-lower (`bafkrei...`)
impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
