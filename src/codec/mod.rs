//! Minimal reader for the tag/varint binary encoding used by ICS-23 proofs
//!
//! The reader walks tagged fields generically and never interprets field
//! semantics; message layouts live in [`crate::proofs::ics23`].

pub mod reader;

pub use reader::{encode_varint, DecodeError, Reader, WireType, MAX_VARINT_LEN};
