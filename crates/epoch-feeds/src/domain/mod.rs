//! # Domain Module
//!
//! Pure value types for feeds: identities, epochs, requests and errors.
//! Nothing here performs I/O.

pub mod entities;
pub mod epoch;
pub mod errors;
pub mod feed;
pub mod value_objects;

pub use entities::*;
pub use epoch::*;
pub use errors::*;
pub use feed::*;
pub use value_objects::*;
