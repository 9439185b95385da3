pub mod adaptive_block_size;
pub mod pow;
pub mod error;
// pub mod pos; // Temporarily commented out as pos.rs was moved

pub use adaptive_block_size::{AdaptiveBlockSizeCalculator, AdaptiveBlockSizeParams, AdaptiveBlockSizeStats};
pub use pow::OxideHasher;
pub use rusty_shared_types::TicketVote;
