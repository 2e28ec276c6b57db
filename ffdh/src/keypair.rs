//! Ephemeral Diffie-Hellman keypairs.

use crate::{Error, Group, Result, U256, U2048};
use alloc::{sync::Arc, vec::Vec};
use bigint::Encoding;
use core::fmt;
use rand_core::CryptoRngCore;
use zeroize::Zeroize;

#[cfg(feature = "getrandom")]
use rand_core::OsRng;

/// Key material produced by one key generation. Never mutated afterwards.
struct KeyMaterial {
    group: Group,
    secret: U256,
    public: U2048,
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

/// Ephemeral Diffie-Hellman keypair in a fixed [`Group`].
///
/// A keypair is either valid, holding freshly generated key material, or
/// empty because generation failed. Check [`DiffieHellmanKeyPair::is_valid`]
/// before relying on it.
///
/// Cloning shares the key material instead of generating a new keypair: all
/// clones export the same public key, and the private exponent is zeroized
/// once the last clone is dropped.
///
/// # Usage
///
/// ```
/// # #[cfg(feature = "getrandom")]
/// # {
/// use ffdh::DiffieHellmanKeyPair;
///
/// let keypair = DiffieHellmanKeyPair::generate();
/// assert!(keypair.is_valid());
///
/// let public_key = keypair.public_key().expect("keypair is valid");
/// assert!(public_key.len() <= 256);
///
/// let shared = keypair.clone();
/// assert_eq!(shared.public_key(), Ok(public_key));
/// # }
/// ```
#[derive(Clone, Default)]
pub struct DiffieHellmanKeyPair {
    inner: Option<Arc<KeyMaterial>>,
}

impl DiffieHellmanKeyPair {
    /// Generate a keypair using the operating system's cryptographically
    /// secure random number generator.
    ///
    /// Failures are logged and produce an empty keypair.
    #[cfg(feature = "getrandom")]
    pub fn generate() -> Self {
        Self::random(&mut OsRng)
    }

    /// Generate a keypair using the operating system's cryptographically
    /// secure random number generator, returning the failure if any.
    #[cfg(feature = "getrandom")]
    pub fn try_generate() -> Result<Self> {
        Self::try_random(&mut OsRng)
    }

    /// Generate a keypair in the default group from the given RNG.
    ///
    /// Failures are logged and produce an empty keypair.
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        Self::try_random(rng).unwrap_or_else(|err| {
            log::error!("DiffieHellmanKeyPair: key generation failed, keypair is empty: {err}");
            Self::empty()
        })
    }

    /// Generate a keypair in the default group from the given RNG.
    pub fn try_random(rng: &mut impl CryptoRngCore) -> Result<Self> {
        Self::try_random_in(Group::DEFAULT, rng)
    }

    /// Generate a keypair in `group` from the given RNG.
    pub fn try_random_in(group: Group, rng: &mut impl CryptoRngCore) -> Result<Self> {
        let bound = group.bind()?;
        let secret = group.random_exponent(rng)?;
        let public = bound.public_value(&secret);
        log::debug!("DiffieHellmanKeyPair: generated keypair in {group:?}");

        Ok(Self {
            inner: Some(Arc::new(KeyMaterial {
                group,
                secret,
                public,
            })),
        })
    }

    /// Keypair holding no key material.
    pub const fn empty() -> Self {
        Self { inner: None }
    }

    /// Does this keypair hold key material?
    pub fn is_valid(&self) -> bool {
        self.inner.is_some()
    }

    /// Group the key material was generated in, or `None` if empty.
    pub fn group(&self) -> Option<Group> {
        self.inner.as_ref().map(|key| key.group)
    }

    /// Serialize the public value as minimal unsigned big-endian bytes.
    ///
    /// The encoding carries no length prefix, leading zero bytes or group
    /// parameters, so it is at most [`Group::element_size`] bytes long and may
    /// be shorter.
    pub fn public_key(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_public_key(&mut out)?;
        Ok(out)
    }

    /// Serialize the public value into `dst`, replacing its contents.
    ///
    /// `dst` is left untouched on failure.
    pub fn write_public_key(&self, dst: &mut Vec<u8>) -> Result<()> {
        let Some(key) = self.inner.as_deref() else {
            log::error!("DiffieHellmanKeyPair::public_key: no key material");
            return Err(Error::MissingKey);
        };

        if key.public >= key.group.modulus() {
            log::error!("DiffieHellmanKeyPair::public_key: public value not reduced modulo p");
            return Err(Error::Extraction);
        }

        let bytes = key.public.to_be_bytes();
        let Some(start) = bytes.iter().position(|&b| b != 0) else {
            log::error!("DiffieHellmanKeyPair::public_key: public value encodes to zero bytes");
            return Err(Error::Serialization);
        };

        dst.clear();
        dst.extend_from_slice(&bytes[start..]);
        Ok(())
    }

    /// Do `self` and `other` share the same key material?
    pub fn shares_key_material(&self, other: &Self) -> bool {
        match (&self.inner, &other.inner) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Number of keypairs currently sharing this key material, or `0` if empty.
    pub fn owner_count(&self) -> usize {
        self.inner.as_ref().map_or(0, Arc::strong_count)
    }
}

impl fmt::Debug for DiffieHellmanKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffieHellmanKeyPair")
            .field("group", &self.group())
            .finish_non_exhaustive()
    }
}
