//! Finite field Diffie-Hellman domain parameters.

use crate::{Error, Result};
use bigint::{
    Encoding, U256, U2048,
    modular::runtime_mod::{DynResidue, DynResidueParams},
};
use rand_core::CryptoRngCore;
use zeroize::Zeroize;

/// Limb count of a group element.
const LIMBS: usize = U2048::LIMBS;

/// Size of a serialized group element in bytes.
const ELEMENT_SIZE: usize = 256;

/// Number of candidate exponents drawn before key generation gives up.
///
/// Each draw lands below `q` with probability ~0.55, so exhausting the budget
/// only happens with a broken RNG.
const EXPONENT_ATTEMPTS: usize = 64;

/// Prime modulus `p` of the RFC 5114 2048-bit MODP group with 256-bit prime
/// order subgroup, serialized as hexadecimal.
const MODP_2048_256_P_HEX: &str = concat!(
    "87a8e61db4b6663cffbbd19c651959998ceef608660dd0f25d2ceed4435e3b00",
    "e00df8f1d61957d4faf7df4561b2aa3016c3d91134096faa3bf4296d830e9a7c",
    "209e0c6497517abd5a8a9d306bcf67ed91f9e6725b4758c022e0b1ef4275bf7b",
    "6c5bfc11d45f9088b941f54eb1e59bb8bc39a0bf12307f5c4fdb70c581b23f76",
    "b63acae1caa6b7902d52526735488a0ef13c6d9a51bfa4ab3ad8347796524d8e",
    "f6a167b5a41825d967e144e5140564251ccacb83e6b486f6b3ca3f7971506026",
    "c0b857f689962856ded4010abd0be621c3a3960a54e710c375f26375d7014103",
    "a4b54330c198af126116d2276e11715f693877fad7ef09cadb094ae91e1a1597",
);

/// Generator `g` of the prime order subgroup, serialized as hexadecimal.
const MODP_2048_256_G_HEX: &str = concat!(
    "3fb32c9b73134d0b2e77506660edbd484ca7b18f21ef205407f4793a1a0ba125",
    "10dbc15077be463fff4fed4aac0bb555be3a6c1b0c6b47b1bc3773bf7e8c6f62",
    "901228f8c28cbb18a55ae31341000a650196f931c77a57f2ddf463e5e9ec144b",
    "777de62aaab8a8628ac376d282d6ed3864e67982428ebc831d14348f6f2f9193",
    "b5045af2767164e1dfc967c1fb3f2e55a4bd1bffe83b9c80d052b985d182ea0a",
    "db2a3b7313d3fe14c8484b1e052588b9b7d2bbd2df016199ecd06e1557cd0915",
    "b3353bbb64e0ec377fd028370df92b52c7891428cdc67eb6184b523d1db246c3",
    "2f63078490f00ef8d647d148d47954515e2327cfef98c582664b4c0f6cc41659",
);

/// Order `q` of the subgroup generated by `g`, serialized as hexadecimal.
const MODP_2048_256_Q_HEX: &str =
    "8cf83642a709a097b447997640129da299b1a47d1eb3750ba308b0fe64f5fbd3";

const MODP_2048_256_P: U2048 = U2048::from_be_hex(MODP_2048_256_P_HEX);
const MODP_2048_256_G: U2048 = U2048::from_be_hex(MODP_2048_256_G_HEX);
const MODP_2048_256_Q: U256 = U256::from_be_hex(MODP_2048_256_Q_HEX);

/// Diffie-Hellman group a keypair is generated in.
///
/// The only supported group is the 2048-bit MODP group with a 256-bit prime
/// order subgroup from [RFC 5114 § 2.3] (OpenSSL's `DH_get_2048_256`). Groups
/// are never negotiated.
///
/// [RFC 5114 § 2.3]: https://www.rfc-editor.org/rfc/rfc5114#section-2.3
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Group {
    /// 2048-bit MODP group with 256-bit prime order subgroup.
    Modp2048_256,
}

impl Group {
    /// Group used when none is named.
    pub const DEFAULT: Self = Group::Modp2048_256;

    /// Prime modulus `p`.
    pub const fn modulus(self) -> U2048 {
        match self {
            Group::Modp2048_256 => MODP_2048_256_P,
        }
    }

    /// Generator `g` of the prime order subgroup.
    pub const fn generator(self) -> U2048 {
        match self {
            Group::Modp2048_256 => MODP_2048_256_G,
        }
    }

    /// Prime order `q` of the subgroup generated by `g`.
    pub const fn order(self) -> U256 {
        match self {
            Group::Modp2048_256 => MODP_2048_256_Q,
        }
    }

    /// Size of the modulus in bits.
    pub const fn modulus_bits(self) -> usize {
        match self {
            Group::Modp2048_256 => 2048,
        }
    }

    /// Size of the subgroup order in bits.
    pub const fn order_bits(self) -> usize {
        match self {
            Group::Modp2048_256 => 256,
        }
    }

    /// Size in bytes of a group element serialized at full width.
    pub const fn element_size(self) -> usize {
        match self {
            Group::Modp2048_256 => ELEMENT_SIZE,
        }
    }

    /// Check the domain parameters are internally consistent.
    ///
    /// Verifies the modulus and order have their advertised sizes, that
    /// `1 < g < p - 1` and that `g^q ≡ 1 (mod p)`. With `q` prime and `g ≠ 1`
    /// the last check means `g` generates a subgroup of order exactly `q`.
    pub fn validate(self) -> Result<()> {
        let p = self.modulus();
        let g = self.generator();
        let q = self.order();

        if p.bits_vartime() != self.modulus_bits() || q.bits_vartime() != self.order_bits() {
            log::error!("{self:?}: modulus or subgroup order has the wrong size");
            return Err(Error::Parameters);
        }

        if g <= U2048::ONE || g >= p.wrapping_sub(&U2048::ONE) {
            log::error!("{self:?}: generator out of range");
            return Err(Error::Parameters);
        }

        let bound = self.bind()?;
        if DynResidue::new(&g, bound.params).pow(&q).retrieve() != U2048::ONE {
            log::error!("{self:?}: generator does not have the subgroup order");
            return Err(Error::Parameters);
        }

        Ok(())
    }

    /// Bind the group modulus into Montgomery form for exponentiation.
    pub(crate) fn bind(self) -> Result<BoundGroup> {
        let params = montgomery_params(&self.modulus()).inspect_err(|_| {
            log::error!("{self:?}: failed to bind modulus into Montgomery form");
        })?;

        Ok(BoundGroup {
            generator: self.generator(),
            params,
        })
    }

    /// Draw a private exponent uniformly from `[1, q - 1]`.
    pub(crate) fn random_exponent(self, rng: &mut impl CryptoRngCore) -> Result<U256> {
        let order = self.order();
        let mut bytes = [0u8; 32];

        for _ in 0..EXPONENT_ATTEMPTS {
            if let Err(err) = rng.try_fill_bytes(&mut bytes) {
                bytes.zeroize();
                log::error!("{self:?}: RNG failure during key generation: {err}");
                return Err(Error::Generation);
            }

            let candidate = U256::from_be_bytes(bytes);
            if candidate != U256::ZERO && candidate < order {
                bytes.zeroize();
                return Ok(candidate);
            }
        }

        bytes.zeroize();
        log::error!("{self:?}: no private exponent in range after {EXPONENT_ATTEMPTS} draws");
        Err(Error::Generation)
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Group parameters in Montgomery form.
pub(crate) struct BoundGroup {
    generator: U2048,
    params: DynResidueParams<LIMBS>,
}

impl BoundGroup {
    /// Compute the public value `g^x mod p`.
    pub(crate) fn public_value(&self, exponent: &U256) -> U2048 {
        DynResidue::new(&self.generator, self.params)
            .pow(exponent)
            .retrieve()
    }
}

/// Montgomery form needs an odd modulus.
fn montgomery_params(modulus: &U2048) -> Result<DynResidueParams<LIMBS>> {
    if modulus.to_be_bytes()[ELEMENT_SIZE - 1] & 1 == 0 {
        return Err(Error::Parameters);
    }

    Ok(DynResidueParams::new(modulus))
}
