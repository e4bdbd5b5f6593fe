//! The ordered key-value register.
//!
//! [`OrderedKeyValue`] is the public face of the crate: it encodes `put`,
//! `move_to` and `delete` calls as operations on an [`OpLog`](crate::log::OpLog)
//! and reads them back through the resolver and materializer.

mod errors;
pub use errors::StoreError;

mod ordered_kv;
pub use ordered_kv::OrderedKeyValue;
