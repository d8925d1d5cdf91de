//! Request signing
//!
//! Every request carries the requester's address, a nanosecond timestamp and
//! a 64-byte low-S secp256k1 signature over
//! `hex(sha256(payload)) || timestamp || provider_address`.

pub mod address;
pub mod clock;
pub mod key;
pub mod message;
pub mod signature;
pub mod transport;

pub use address::{address_prefix, decode_address, derive_address, validate_provider_address};
pub use clock::timestamp_nanos;
pub use key::PrivateKey;
pub use message::{build_signing_input, SignatureComponents, SignaturePayload};
pub use signature::{sign, sign_bytes, verify, RawSignature, SIGNATURE_LEN};
pub use transport::{
    HttpExchange, HttpResponse, OutgoingRequest, ProviderBinding, ReqwestExchange,
    SigningTransport, HEADER_AUTHORIZATION, HEADER_REQUESTER_ADDRESS, HEADER_TIMESTAMP,
};
