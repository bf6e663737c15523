//! stackboi - stacked branches and pull requests for git
//!
//! Tracks stacks of dependent branches, each mapped to a chain of PRs, and
//! keeps the chain consistent as branches are pushed, merged and rebased.
//!
//! # Modules
//!
//! - [`stack`]: stack model and lookups
//! - [`status`]: per-branch sync status
//! - [`cascade`]: rebase cascade after a PR merges
//! - [`pr`]: PR titles, bases, labels and stack overview
//! - [`view`]: live snapshots of every stack
//! - [`vcs`]: git collaborator
//! - [`platform`]: hosting collaborator (GitHub)

pub mod auth;
pub mod cascade;
pub mod config;
pub mod error;
pub mod platform;
pub mod pr;
pub mod session;
pub mod stack;
pub mod status;
pub mod types;
pub mod vcs;
pub mod view;

pub use error::{Error, Result};
pub use session::Session;
