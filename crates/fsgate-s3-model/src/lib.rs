//! Typed operation contract between the fsgate request frontend and its
//! storage backends.
//!
//! The frontend owns HTTP, signatures, and XML rendering; backends own
//! the object namespace. Everything that crosses that boundary lives here:
//! per-operation input and output structs, the shared entity types
//! (accounts, ACLs, listing entries, parts), the streaming body wrapper,
//! and the S3 error taxonomy.

pub mod error;
pub mod input;
pub mod output;
pub mod request;
pub mod types;

pub use error::{S3Error, S3ErrorCode};
pub use request::StreamingBlob;
