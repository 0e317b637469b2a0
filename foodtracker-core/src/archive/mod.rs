//! On-disk archive of meal records.
//!
//! Records are stored as Automerge documents. The archive file holds a single
//! document whose root key `meals` is a list of record maps, in collection
//! order:
//!
//! ```text
//! {
//!   "meals": [
//!     { "name": "string", "photo": bytes | absent, "rating": int },
//!     ...
//!   ]
//! }
//! ```
//!
//! A standalone record (see [`Meal::to_bytes`](crate::Meal::to_bytes)) uses
//! the same three keys on the document root.

mod codec;
mod storage;

pub use codec::{decode_archive, encode_archive, read_meal, write_meal, DecodeError, EncodeError};
pub use storage::{ArchiveError, MealArchive, ARCHIVE_FILENAME};
