//! # courier-memory
//!
//! Payment record storage for Courier: an in-memory map mirrored to a JSON file.

pub mod decorate;
pub mod store;

pub use decorate::decorate;
pub use store::PaymentStore;
