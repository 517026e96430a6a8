//! scrimnote-core: timestamped comment synchronization for scrim footage.
//!
//! Everything here is UI-agnostic. The host application owns the event loop
//! and feeds [`engine::SyncEngine`] the timer events it posts back through the
//! host's channel; the comment list itself lives in [`store::CommentStore`]
//! and is filtered with [`filter::filter_comments`] before it reaches the
//! highlight controller.
//!
//! Modules:
//!
//! - [`annotation`]: tag and mention extraction, display segments
//! - [`filter`]: author/tag/mention facets and the AND-of-ORs predicate
//! - [`playback`], [`highlight`], [`engine`]: position sampling and the
//!   match-window highlight with its scroll lock
//! - [`composer`]: multi-line text buffer with `@` suggestions
//! - [`api`], [`store`]: HTTP client and request/replace comment store

pub mod annotation;
pub mod api;
pub mod composer;
pub mod engine;
pub mod error;
pub mod filter;
pub mod highlight;
pub mod playback;
pub mod store;
pub mod timer;
pub mod types;

pub use error::{Error, Result};
