//! Object-storage abstractions used to mirror output files remotely.
//!
//! The sink talks to remote storage only through the [`ObjectIO`] trait, so
//! the provider can be swapped and tests can run against an in-memory store:
//!
//! - [`FakeObjectIO`] - In-memory store (shared between clones), with an
//!   injectable upload failure
//! - [`S3ObjectIO`] - Amazon S3 via `object_store` (feature `object-store-s3`)
//!
//! ## Usage
//!
//! ```
//! use postflow::io::cloud::*;
//!
//! # fn main() -> CloudResult<()> {
//! let storage = FakeObjectIO::new();
//! storage.put_object("bucket", "exports/posts.parquet", b"PAR1")?;
//! assert!(storage.object_exists("bucket", "exports/posts.parquet")?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`CloudResult<T>`] where the error is [`CloudIOError`],
//! categorized by [`ErrorKind`]. Nothing here retries; errors go straight to
//! the caller.

pub mod fake;
pub mod helpers;
#[cfg(feature = "object-store-s3")]
pub mod s3;
pub mod traits;

pub use fake::*;
#[cfg(feature = "object-store-s3")]
pub use s3::S3ObjectIO;
pub use traits::*;
