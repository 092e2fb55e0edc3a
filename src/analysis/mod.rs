//! Concrete collaborators for the listing.
//!
//! `memory` supplies bytes by virtual address, `view` is an in-memory
//! [`crate::core::program::Program`], `loader` reads object files and
//! `decode` fills a view by sweeping function bodies with a decoder backend.

pub mod decode;
pub mod loader;
pub mod memory;
pub mod view;
