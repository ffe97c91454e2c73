//! Public keys, private keys, and signatures.
//!
//! On the wire these are opaque tagged blobs: one algorithm byte (`0` for
//! secp256k1, `1` for secp256r1) followed by a fixed-size payload. The
//! schema engine never inspects the payload; all it needs from this module
//! is the text↔bytes conversion pair.
//!
//! Text forms are base58 with a trailing 4-byte RIPEMD-160 checksum. The
//! modern representation prefixes the algorithm (`PUB_K1_…`, `PVT_R1_…`,
//! `SIG_K1_…`) and keys the checksum with the algorithm suffix; K1 public
//! keys additionally accept and produce the legacy unprefixed `EOS…` form,
//! whose checksum is computed over the bare payload.

use std::str::FromStr;

use ripemd::{Digest, Ripemd160};

use crate::error::ErrorKind;

/// Signature algorithm discriminant; doubles as the wire tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    K1 = 0,
    R1 = 1,
}

impl KeyType {
    pub fn from_tag(tag: u8) -> Result<Self, ErrorKind> {
        match tag {
            0 => Ok(KeyType::K1),
            1 => Ok(KeyType::R1),
            other => Err(ErrorKind::InvalidTag(other)),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            KeyType::K1 => "K1",
            KeyType::R1 => "R1",
        }
    }
}

fn ripemd_checksum(payload: &[u8], suffix: &str) -> [u8; 4] {
    let mut hasher = Ripemd160::new();
    hasher.update(payload);
    hasher.update(suffix.as_bytes());
    let digest = hasher.finalize();
    [digest[0], digest[1], digest[2], digest[3]]
}

fn to_checksummed_base58(payload: &[u8], suffix: &str) -> String {
    let mut buf = payload.to_vec();
    buf.extend_from_slice(&ripemd_checksum(payload, suffix));
    bs58::encode(buf).into_string()
}

fn from_checksummed_base58(s: &str, len: usize, suffix: &str) -> Result<Vec<u8>, ErrorKind> {
    let buf = bs58::decode(s)
        .into_vec()
        .map_err(|_| ErrorKind::Parse("expected base58 string".to_owned()))?;
    if buf.len() != len + 4 {
        return Err(ErrorKind::OutOfRange("key has incorrect length".to_owned()));
    }
    let (payload, checksum) = buf.split_at(len);
    if checksum != ripemd_checksum(payload, suffix) {
        return Err(ErrorKind::Parse("checksum doesn't match".to_owned()));
    }
    Ok(payload.to_vec())
}

macro_rules! tagged_blob {
    ($name:ident, $len:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            pub key_type: KeyType,
            pub data: [u8; $len],
        }

        impl $name {
            pub const DATA_LEN: usize = $len;

            pub fn new(key_type: KeyType, data: [u8; $len]) -> Self {
                $name { key_type, data }
            }
        }
    };
}

tagged_blob!(PublicKey, 33);
tagged_blob!(PrivateKey, 32);
tagged_blob!(Signature, 65);

fn parse_payload<const N: usize>(s: &str, suffix: &str) -> Result<[u8; N], ErrorKind> {
    let buf = from_checksummed_base58(s, N, suffix)?;
    let mut data = [0u8; N];
    data.copy_from_slice(&buf);
    Ok(data)
}

impl FromStr for PublicKey {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, ErrorKind> {
        if let Some(rest) = s.strip_prefix("PUB_K1_") {
            Ok(PublicKey::new(KeyType::K1, parse_payload(rest, "K1")?))
        } else if let Some(rest) = s.strip_prefix("PUB_R1_") {
            Ok(PublicKey::new(KeyType::R1, parse_payload(rest, "R1")?))
        } else if let Some(rest) = s.strip_prefix("EOS") {
            Ok(PublicKey::new(KeyType::K1, parse_payload(rest, "")?))
        } else {
            Err(ErrorKind::Parse("unrecognized public key format".to_owned()))
        }
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.key_type {
            KeyType::K1 => write!(f, "EOS{}", to_checksummed_base58(&self.data, "")),
            KeyType::R1 => write!(f, "PUB_R1_{}", to_checksummed_base58(&self.data, "R1")),
        }
    }
}

impl FromStr for PrivateKey {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, ErrorKind> {
        if let Some(rest) = s.strip_prefix("PVT_K1_") {
            Ok(PrivateKey::new(KeyType::K1, parse_payload(rest, "K1")?))
        } else if let Some(rest) = s.strip_prefix("PVT_R1_") {
            Ok(PrivateKey::new(KeyType::R1, parse_payload(rest, "R1")?))
        } else {
            Err(ErrorKind::Parse("unrecognized private key format".to_owned()))
        }
    }
}

impl std::fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suffix = self.key_type.suffix();
        write!(f, "PVT_{}_{}", suffix, to_checksummed_base58(&self.data, suffix))
    }
}

impl FromStr for Signature {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, ErrorKind> {
        if let Some(rest) = s.strip_prefix("SIG_K1_") {
            Ok(Signature::new(KeyType::K1, parse_payload(rest, "K1")?))
        } else if let Some(rest) = s.strip_prefix("SIG_R1_") {
            Ok(Signature::new(KeyType::R1, parse_payload(rest, "R1")?))
        } else {
            Err(ErrorKind::Parse("unrecognized signature format".to_owned()))
        }
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suffix = self.key_type.suffix();
        write!(f, "SIG_{}_{}", suffix, to_checksummed_base58(&self.data, suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample<const N: usize>() -> [u8; N] {
        let mut data = [0u8; N];
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(7).wrapping_add(3);
        }
        data
    }

    #[test]
    fn legacy_public_key_round_trip() {
        let key = PublicKey::new(KeyType::K1, sample());
        let text = key.to_string();
        assert!(text.starts_with("EOS"));
        assert_eq!(PublicKey::from_str(&text).unwrap(), key);
    }

    #[test]
    fn prefixed_forms_round_trip() {
        let key = PublicKey::new(KeyType::R1, sample());
        let text = key.to_string();
        assert!(text.starts_with("PUB_R1_"));
        assert_eq!(PublicKey::from_str(&text).unwrap(), key);

        let sk = PrivateKey::new(KeyType::K1, sample());
        assert_eq!(PrivateKey::from_str(&sk.to_string()).unwrap(), sk);

        let sig = Signature::new(KeyType::R1, sample());
        assert_eq!(Signature::from_str(&sig.to_string()).unwrap(), sig);
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let key = PublicKey::new(KeyType::K1, sample());
        let mut text = key.to_string();
        let flipped = if text.ends_with('2') { '3' } else { '2' };
        text.pop();
        text.push(flipped);
        assert!(PublicKey::from_str(&text).is_err());
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        assert!(PublicKey::from_str("PUB_WA_abcdef").is_err());
        assert!(Signature::from_str("EOSnotasig").is_err());
    }

    #[test]
    fn tag_bytes() {
        assert_eq!(KeyType::from_tag(0).unwrap(), KeyType::K1);
        assert_eq!(KeyType::from_tag(1).unwrap(), KeyType::R1);
        assert_eq!(KeyType::from_tag(2), Err(ErrorKind::InvalidTag(2)));
    }
}
