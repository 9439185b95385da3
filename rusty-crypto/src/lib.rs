//! Cryptographic primitives for Rusty Coin

pub mod hash;
pub mod keypair;
pub mod signature;
pub mod dkg;
pub mod dkg_manager;

pub use dkg::DKGProtocol;
pub use dkg_manager::{DKGManager, DKGManagerConfig, DKGSessionStatus, DKGManagerStats};
