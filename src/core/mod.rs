//! Core byte array types.
//!
//! [`ByteArray`] is the growable, freezable buffer at the heart of the crate.
//! It has no I/O dependencies; chunked reading lives in [`crate::io`].

pub mod bytearray;
pub mod value;

pub use bytearray::{AppendSource, ByteArray};
