//! Backing resources reached by tool adapters.
//!
//! Every client in this crate reports failures as [`ResourceError`] values;
//! adapters translate those into tool failures before anything reaches a model.

mod auth;
mod error;
mod headcount;
mod mailbox;
mod memory;

#[cfg(feature = "gmail")]
pub mod gmail;

pub use auth::{AccessToken, AuthorizationProvider, StaticTokenProvider};
pub use error::{ResourceError, ResourceErrorKind};
pub use headcount::{HeadcountSource, StaticHeadcount};
pub use mailbox::{
    AttachmentSummary, MailFilter, Mailbox, MessageDetail, MessageSummary, ResourceFuture,
    SUMMARY_HEADERS,
};
pub use memory::{InMemoryMailbox, StoredMessage};

#[cfg(feature = "gmail")]
pub use gmail::GmailMailbox;
