//! In-memory mailbox used for demos and tests.
//!
//! ```rust
//! use rresource::{InMemoryMailbox, StoredMessage};
//!
//! let mailbox = InMemoryMailbox::new()
//!     .with_message(StoredMessage::new("m1", "alice@example.com", "Lunch?").unread());
//! assert_eq!(mailbox.len(), 1);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::mailbox::summary_headers;
use crate::{
    AttachmentSummary, MailFilter, Mailbox, MessageDetail, MessageSummary, ResourceError,
    ResourceFuture,
};

const SNIPPET_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    detail: MessageDetail,
    labels: BTreeSet<String>,
}

impl StoredMessage {
    pub fn new(id: impl Into<String>, from: impl Into<String>, subject: impl Into<String>) -> Self {
        let id = id.into();
        let headers = BTreeMap::from([
            ("From".to_string(), from.into()),
            ("Subject".to_string(), subject.into()),
        ]);

        Self {
            detail: MessageDetail {
                thread_id: Some(format!("thread-{id}")),
                id,
                headers,
                body: String::new(),
                snippet: String::new(),
                attachments: Vec::new(),
            },
            labels: BTreeSet::from(["INBOX".to_string()]),
        }
    }

    pub fn unread(self) -> Self {
        self.label("UNREAD")
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.detail.headers.insert(name.into(), value.into());
        self
    }

    pub fn thread(mut self, thread_id: impl Into<String>) -> Self {
        self.detail.thread_id = Some(thread_id.into());
        self
    }

    /// Sets the body and derives the snippet from it.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.detail.snippet = snippet_of(&body);
        self.detail.body = body;
        self
    }

    pub fn attachment(mut self, attachment: AttachmentSummary) -> Self {
        self.detail.attachments.push(attachment);
        self
    }

    pub fn id(&self) -> &str {
        &self.detail.id
    }

    fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    fn header_contains(&self, name: &str, needle: &str) -> bool {
        self.detail
            .headers
            .iter()
            .any(|(key, value)| key.eq_ignore_ascii_case(name) && contains_folded(value, needle))
    }

    fn matches(&self, query: &str) -> bool {
        query.split_whitespace().all(|term| self.matches_term(term))
    }

    fn matches_term(&self, term: &str) -> bool {
        match term.split_once(':') {
            Some(("from", value)) => self.header_contains("From", value),
            Some(("to", value)) => self.header_contains("To", value),
            Some(("subject", value)) => self.header_contains("Subject", value),
            Some(("is", "unread")) => self.has_label("UNREAD"),
            Some(("label", value)) => self
                .labels
                .iter()
                .any(|label| label.eq_ignore_ascii_case(value)),
            _ => {
                self.header_contains("Subject", term)
                    || self.header_contains("From", term)
                    || contains_folded(&self.detail.body, term)
            }
        }
    }

    fn summary(&self) -> MessageSummary {
        MessageSummary {
            id: self.detail.id.clone(),
            thread_id: self.detail.thread_id.clone(),
            headers: summary_headers(&self.detail.headers),
            snippet: self.detail.snippet.clone(),
        }
    }
}

/// Mailbox holding a fixed set of messages in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryMailbox {
    messages: Vec<StoredMessage>,
}

impl InMemoryMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: StoredMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// A small mailbox for running the binary without mailbox credentials.
    pub fn demo() -> Self {
        Self::new()
            .with_message(
                StoredMessage::new(
                    "demo-1",
                    "alice@example.com",
                    "Quarterly planning notes",
                )
                .header("To", "me@example.com")
                .header("Date", "Mon, 12 Oct 2026 09:15:00 +0000")
                .body("Hi! Attached are the planning notes for next quarter. Please review before Thursday.")
                .attachment(AttachmentSummary {
                    filename: "planning.txt".to_string(),
                    mime_type: Some("text/plain".to_string()),
                    attachment_id: Some("att-1".to_string()),
                    size: Some(64),
                    content_preview: Some("Q1 goals: ship the relay, hire two engineers.".to_string()),
                })
                .unread(),
            )
            .with_message(
                StoredMessage::new("demo-2", "billing@example.net", "Your invoice is ready")
                    .header("To", "me@example.com")
                    .header("Date", "Tue, 13 Oct 2026 14:02:00 +0000")
                    .body("Invoice #4411 for October is now available in your account.")
                    .unread(),
            )
            .with_message(
                StoredMessage::new("demo-3", "alice@example.com", "Re: lunch")
                    .header("To", "me@example.com")
                    .header("Date", "Wed, 14 Oct 2026 11:40:00 +0000")
                    .body("Noon works for me, see you at the usual place."),
            )
    }
}

impl Mailbox for InMemoryMailbox {
    fn list<'a>(
        &'a self,
        filter: &'a MailFilter,
        limit: usize,
    ) -> ResourceFuture<'a, Result<Vec<MessageSummary>, ResourceError>> {
        Box::pin(async move {
            Ok(self
                .messages
                .iter()
                .filter(|message| message.has_label(filter.label_id()))
                .take(limit)
                .map(StoredMessage::summary)
                .collect())
        })
    }

    fn search<'a>(
        &'a self,
        query: &'a str,
        limit: usize,
    ) -> ResourceFuture<'a, Result<Vec<MessageSummary>, ResourceError>> {
        Box::pin(async move {
            Ok(self
                .messages
                .iter()
                .filter(|message| message.matches(query))
                .take(limit)
                .map(StoredMessage::summary)
                .collect())
        })
    }

    fn get<'a>(
        &'a self,
        id: &'a str,
    ) -> ResourceFuture<'a, Result<MessageDetail, ResourceError>> {
        Box::pin(async move {
            self.messages
                .iter()
                .find(|message| message.id() == id)
                .map(|message| message.detail.clone())
                .ok_or_else(|| ResourceError::not_found(format!("message '{id}' not found")))
        })
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn snippet_of(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(SNIPPET_CHARS).collect()
}
