// rusty-wallet/src/keys.rs

use anyhow::{anyhow, Result};
use bip39::{Mnemonic, Language};
use ed25519_dalek::{Keypair, Signer, PublicKey, SecretKey};
use sha2::{Sha512, Digest};

// Simple HD path implementation since we can't use the hdpath crate's full features
#[derive(Debug, Clone)]
pub struct HDPath {
    path: Vec<u32>,
}

impl HDPath {
    pub fn new(path: &[u32]) -> Self {
        HDPath { path: path.to_vec() }
    }

    pub fn to_string(&self) -> String {
        let mut s = String::from("m");
        for &i in &self.path {
            s.push_str(&format!("/{}'", i));
        }
        s
    }
}

/// HD Wallet implementation using ed25519 keys
#[derive(Debug, Clone)]
pub struct HDWallet {
    mnemonic: Mnemonic,
    seed: [u8; 64],
}

impl HDWallet {
    /// Generates a new HD wallet with a random mnemonic
    pub fn new_random() -> Result<Self> {
        let mnemonic = Mnemonic::from_entropy(&[0; 16])?;
        let seed = mnemonic.to_seed("");
        let mut seed_bytes = [0u8; 64];
        seed_bytes.copy_from_slice(&seed[..64]);
        Ok(Self { mnemonic, seed: seed_bytes })
    }

    /// Restores an HD wallet from an existing mnemonic phrase
    pub fn from_mnemonic(mnemonic_phrase: &str) -> Result<Self> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, mnemonic_phrase.trim())
            .map_err(|e| anyhow!("Invalid mnemonic: {}", e))?;
        let seed = mnemonic.to_seed("");
        let mut seed_bytes = [0u8; 64];
        seed_bytes.copy_from_slice(&seed[..64]);
        Ok(Self { mnemonic, seed: seed_bytes })
    }

    /// Derives a key pair for a given path (e.g., m/44'/0'/0'/0/0)
    /// Note: This is a simplified, non-BIP32 compliant implementation
    pub fn derive_key(&self, path: &str) -> Result<Keypair> {
        // In a real implementation, use a proper BIP32/44 derivation
        // This is a simplified version that just hashes the seed with the path
        let mut hasher = Sha512::new();
        hasher.update(&self.seed);
        hasher.update(path.as_bytes());
        let result = hasher.finalize();
        
        let secret_key = SecretKey::from_bytes(&result[..32])
            .map_err(|e| anyhow!("Failed to create secret key: {}", e))?;
        let public_key = PublicKey::from(&secret_key);
        
        Ok(Keypair { secret: secret_key, public: public_key })
    }

    /// Returns the mnemonic phrase of the wallet
    pub fn mnemonic_phrase(&self) -> String {
        self.mnemonic.to_string()
    }
    
    /// Returns the seed bytes of the wallet
    pub fn seed_bytes(&self) -> &[u8; 64] {
        &self.seed
    }
    
    /// Get the public key as bytes
    pub fn public_key_bytes(&self) -> Result<Vec<u8>> {
        let keypair = self.derive_key("m/0")?; // Using a default derivation path
        Ok(keypair.public.to_bytes().to_vec())
    }
    
    /// Sign a message with the derived key
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let keypair = self.derive_key("m/0")?; // Using a default derivation path
        Ok(keypair.sign(message).to_bytes().to_vec())
    }
}

// Placeholder for key management functionalities