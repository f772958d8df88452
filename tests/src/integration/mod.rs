//! End-to-end scenario flows.
//!
//! Every flow signs with real secp256k1 keys and verifies on read, so these
//! exercise the same path a deployment would.

pub mod flows;
