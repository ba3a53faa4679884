//! sitepub-publish: commit a built site to the publishing branch and push it.
//!
//! - [`git`]: the `git` CLI wrapper
//! - [`content`]: artifact checks and content replacement
//! - [`publish`]: commit step, [`PublishReport`] and the on-disk receipt
//! - [`push`]: push step through a [`RemoteGuard`]-scoped transient remote

pub mod content;
mod error;
pub mod git;
pub mod publish;
pub mod push;

pub use error::{InvariantError, PublishError};
pub use git::Git;
pub use publish::{
    clear_receipt, commit_message, load_receipt, publish, save_receipt, PublishOptions,
    PublishReceipt, PublishReport,
};
pub use push::{publish_push, PushOptions, PushReport, RemoteGuard};
