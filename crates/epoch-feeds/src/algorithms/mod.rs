//! # Algorithms Module
//!
//! Pure algorithms: epoch assignment, chunk encoding, authentication and the
//! lookup search.

pub mod codec;
pub mod lookup;
pub mod next_epoch;
pub mod signing;

pub use codec::{decode, encode, signing_digest, UpdateChunk, MIN_CHUNK_LENGTH};
pub use lookup::{search, EpochReader, Found, SearchOutcome};
pub use next_epoch::{first_epoch, next_epoch, next_level};
pub use signing::{authenticate, verify_update};
