//! Contract types shared by every layer
//!
//! - `entity_ref`: Universal entity addressing
//! - `entity_kind`: Entity kind enumeration
//!
//! ## Usage
//!
//! ```
//! use agora_core::contract::{EntityKind, EntityRef};
//! ```

pub mod entity_kind;
pub mod entity_ref;

// Re-exports
pub use entity_kind::EntityKind;
pub use entity_ref::EntityRef;
