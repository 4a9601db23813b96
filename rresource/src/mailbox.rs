//! Mailbox boundary and the record shapes it produces.

use std::collections::BTreeMap;

use rcommon::BoxFuture;
use serde::Serialize;

use crate::ResourceError;

pub type ResourceFuture<'a, T> = BoxFuture<'a, T>;

/// Headers kept on summary records.
pub const SUMMARY_HEADERS: [&str; 4] = ["From", "To", "Subject", "Date"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSummary {
    pub id: String,
    pub thread_id: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentSummary {
    pub filename: String,
    pub mime_type: Option<String>,
    pub attachment_id: Option<String>,
    pub size: Option<u64>,
    pub content_preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDetail {
    pub id: String,
    pub thread_id: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub snippet: String,
    pub attachments: Vec<AttachmentSummary>,
}

impl MessageDetail {
    /// Projects the full record onto the summary shape returned by list and search.
    pub fn summary(&self) -> MessageSummary {
        MessageSummary {
            id: self.id.clone(),
            thread_id: self.thread_id.clone(),
            headers: summary_headers(&self.headers),
            snippet: self.snippet.clone(),
        }
    }
}

pub(crate) fn summary_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter(|(name, _)| {
            SUMMARY_HEADERS
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(name))
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailFilter {
    Unread,
    Label(String),
}

impl MailFilter {
    pub fn label_id(&self) -> &str {
        match self {
            Self::Unread => "UNREAD",
            Self::Label(label) => label.as_str(),
        }
    }
}

/// Read-only mailbox capability consumed by the mailbox tool adapters.
///
/// Implementations return records in a stable order so repeated calls against
/// an unchanged mailbox produce identical results.
pub trait Mailbox: Send + Sync {
    fn list<'a>(
        &'a self,
        filter: &'a MailFilter,
        limit: usize,
    ) -> ResourceFuture<'a, Result<Vec<MessageSummary>, ResourceError>>;

    /// `query` is passed through in the backing service's own query language.
    fn search<'a>(
        &'a self,
        query: &'a str,
        limit: usize,
    ) -> ResourceFuture<'a, Result<Vec<MessageSummary>, ResourceError>>;

    fn get<'a>(&'a self, id: &'a str)
    -> ResourceFuture<'a, Result<MessageDetail, ResourceError>>;
}
