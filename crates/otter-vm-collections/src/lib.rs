//! # Otter VM Collections
//!
//! The `Set` object model of the Otter JavaScript runtime: ordered,
//! SameValueZero-deduplicated storage, live iterators, the `Set` constructor
//! and prototype, and the Set Record adapter used by set algorithms to
//! consume foreign set-like objects.
//!
//! ## Design Principles
//!
//! - **Thread-safe**: Values and objects are `Send + Sync`
//! - **Reentrant**: No lock is held while user code runs
//! - **Live iteration**: Tombstoned storage keeps iterator positions stable;
//!   compaction waits until no cursor is attached

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod builtin_builder;
pub mod context;
pub mod convert;
pub mod error;
pub mod intrinsics;
pub mod intrinsics_impl;
pub mod iterator;
pub mod object;
pub mod runtime;
pub mod set_data;
pub mod set_record;
pub mod string;
pub mod value;

pub use context::{NativeContext, VmContext};
pub use error::{VmError, VmResult};
pub use iterator::IteratorRecord;
pub use object::{JsObject, PropertyKey};
pub use runtime::{RuntimeConfig, VmRuntime};
pub use set_data::{SetCursor, SetData, SetDataConfig};
pub use set_record::{SetRecord, get_keys_iterator, get_set_record};
pub use string::JsString;
pub use value::Value;
