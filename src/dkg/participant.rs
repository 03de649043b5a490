//! Participant identities and roster validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arith::{CurvePoint, Fr, PairingBackend};
use crate::errors::Error;

/// A 20-byte on-chain account identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// One registered participant, immutable for the duration of a run.
///
/// `index` is the evaluation point used for this participant in every
/// polynomial of the run; indices are distinct and fixed at
/// registration, numbered from 1 (0 is reserved for the shared secret).
#[derive(Debug)]
pub struct Participant<B: PairingBackend<Scalar = Fr>> {
    pub address: Address,
    pub index: u32,
    pub public_key: B::G1,
}

impl<B: PairingBackend<Scalar = Fr>> Clone for Participant<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: PairingBackend<Scalar = Fr>> Copy for Participant<B> {}

impl<B: PairingBackend<Scalar = Fr>> PartialEq for Participant<B> {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
            && self.index == other.index
            && self.public_key == other.public_key
    }
}

impl<B: PairingBackend<Scalar = Fr>> Eq for Participant<B> {}

/// Validates a registration roster.
///
/// Requires indices strictly ascending within `[1, n]` (which also
/// fixes the wire order of share vectors), pairwise-distinct addresses,
/// and pairwise-distinct non-identity encryption keys. A duplicated
/// encryption key breaks the uniqueness of the Diffie–Hellman pads, so
/// the whole run is rejected rather than attributed to one holder.
pub fn validate_roster<B: PairingBackend<Scalar = Fr>>(
    participants: &[Participant<B>],
) -> Result<(), Error> {
    let n = participants.len();
    for (pos, participant) in participants.iter().enumerate() {
        if participant.index < 1 || participant.index as usize > n {
            return Err(Error::bad_input_from(
                participant.index,
                "participant index out of range",
            ));
        }
        if pos > 0 && participants[pos - 1].index >= participant.index {
            return Err(Error::bad_input_from(
                participant.index,
                "participant indices must be strictly ascending",
            ));
        }
        if participant.public_key.is_identity() {
            return Err(Error::bad_input_from(
                participant.index,
                "identity encryption key",
            ));
        }
        for earlier in &participants[..pos] {
            if earlier.public_key == participant.public_key {
                return Err(Error::bad_input("duplicate encryption public key"));
            }
            if earlier.address == participant.address {
                return Err(Error::bad_input("duplicate participant address"));
            }
        }
    }
    Ok(())
}

/// Locates a participant's slot in the canonical (ascending-index)
/// share-vector layout.
pub(crate) fn slot_of_index<B: PairingBackend<Scalar = Fr>>(
    participants: &[Participant<B>],
    index: u32,
) -> Option<usize> {
    participants.iter().position(|p| p.index == index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::Bn254Backend;
    use crate::dkg::generate_keypair;
    use rand::thread_rng;

    fn roster(n: usize) -> Vec<Participant<Bn254Backend>> {
        let mut rng = thread_rng();
        (1..=n as u32)
            .map(|index| {
                let (_, public_key) = generate_keypair::<Bn254Backend, _>(&mut rng).unwrap();
                Participant {
                    address: Address([index as u8; 20]),
                    index,
                    public_key,
                }
            })
            .collect()
    }

    #[test]
    fn valid_roster_accepted() {
        assert!(validate_roster(&roster(4)).is_ok());
    }

    #[test]
    fn out_of_range_index_rejected() {
        let mut participants = roster(4);
        participants[3].index = 5;
        assert!(matches!(
            validate_roster(&participants),
            Err(Error::BadInput { index: Some(5), .. })
        ));
    }

    #[test]
    fn duplicate_public_key_rejected() {
        let mut participants = roster(4);
        participants[2].public_key = participants[0].public_key;
        assert!(validate_roster(&participants).is_err());
    }

    #[test]
    fn unsorted_roster_rejected() {
        let mut participants = roster(4);
        participants.swap(1, 2);
        assert!(validate_roster(&participants).is_err());
    }

    #[test]
    fn address_displays_as_hex() {
        let address = Address([0xab; 20]);
        assert!(address.to_string().starts_with("0xabab"));
    }
}
