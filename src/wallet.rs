//! Ed25519 accounts derived from BIP-39 mnemonics, the way Sui wallets derive them.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bip39::Mnemonic;
use blake2::{digest::consts::U32, Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey};
use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::address::SuiAddress;

type Blake2b256 = Blake2b<U32>;
type HmacSha512 = Hmac<Sha512>;

const ED25519_FLAG: u8 = 0x00;
const ED25519_SEED_KEY: &[u8] = b"ed25519 seed";
const HARDENED_OFFSET: u32 = 0x8000_0000;
/// m/44'/784'/0'/0'/0'
const DERIVATION_PATH: [u32; 5] = [44, 784, 0, 0, 0];
/// Intent scope `TransactionData`, version `V0`, app id `Sui`.
const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

pub struct SuiWallet {
    signing_key: SigningKey,
    address: SuiAddress,
}

impl fmt::Debug for SuiWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiWallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl SuiWallet {
    pub fn from_mnemonic(phrase: &str) -> eyre::Result<Self> {
        let mnemonic = Mnemonic::parse_normalized(phrase.trim())
            .map_err(|e| eyre::eyre!("Invalid mnemonic phrase: {e}"))?;
        let secret = derive_ed25519_secret(&mnemonic.to_seed_normalized(""), &DERIVATION_PATH)?;

        Ok(Self::from_secret(secret))
    }

    pub fn from_secret(secret: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&secret);
        let address = address_of(&signing_key.verifying_key().to_bytes());

        Self {
            signing_key,
            address,
        }
    }

    pub fn address(&self) -> SuiAddress {
        self.address
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Signs BCS transaction bytes and returns the base64 serialized signature
    /// (`flag || signature || public key`) expected by `sui_executeTransactionBlock`.
    pub fn sign_transaction(&self, tx_bytes: &[u8]) -> String {
        let digest = transaction_digest(tx_bytes);
        let signature = self.signing_key.sign(&digest);

        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(&self.public_key());

        STANDARD.encode(serialized)
    }
}

fn address_of(public_key: &[u8; 32]) -> SuiAddress {
    let mut hasher = Blake2b256::new();
    hasher.update([ED25519_FLAG]);
    hasher.update(public_key);

    SuiAddress::new(hasher.finalize().into())
}

fn transaction_digest(tx_bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(TRANSACTION_INTENT);
    hasher.update(tx_bytes);

    hasher.finalize().into()
}

/// SLIP-0010 derivation for ed25519, where every path segment is hardened.
fn derive_ed25519_secret(seed: &[u8], path: &[u32]) -> eyre::Result<[u8; 32]> {
    let (mut key, mut chain_code) = hmac_split(ED25519_SEED_KEY, &[seed])?;

    for index in path {
        let hardened = (index | HARDENED_OFFSET).to_be_bytes();
        (key, chain_code) = hmac_split(&chain_code, &[&[0u8][..], &key[..], &hardened[..]])?;
    }

    Ok(key)
}

fn hmac_split(key: &[u8], data: &[&[u8]]) -> eyre::Result<([u8; 32], [u8; 32])> {
    let mut mac =
        HmacSha512::new_from_slice(key).map_err(|e| eyre::eyre!("HMAC key rejected: {e}"))?;
    for chunk in data {
        mac.update(chunk);
    }
    let output = mac.finalize().into_bytes();

    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&output[..32]);
    right.copy_from_slice(&output[32..]);

    Ok((left, right))
}
