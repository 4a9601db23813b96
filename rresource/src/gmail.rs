//! Gmail REST client implementing [`Mailbox`].
//!
//! Summaries come from `format=metadata` fetches restricted to
//! [`SUMMARY_HEADERS`]; full records decode `text/plain` parts and preview
//! attachment content rather than inlining it.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{
    AccessToken, AttachmentSummary, AuthorizationProvider, MailFilter, Mailbox, MessageDetail,
    MessageSummary, ResourceError, ResourceFuture, SUMMARY_HEADERS,
};

/// Attachment previews keep at most this many characters.
pub const ATTACHMENT_PREVIEW_CHARS: usize = 1000;

const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub struct GmailMailbox {
    client: Client,
    base_url: String,
    auth: Arc<dyn AuthorizationProvider>,
}

impl std::fmt::Debug for GmailMailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailMailbox")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GmailMailbox {
    pub fn new(auth: Arc<dyn AuthorizationProvider>) -> Self {
        Self {
            client: Client::new(),
            base_url: "https://gmail.googleapis.com/gmail/v1".to_string(),
            auth,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Each segment is appended percent-encoded, so ids cannot alter the path or query.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ResourceError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| ResourceError::other(format!("invalid Gmail url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| ResourceError::other("Gmail url cannot be a base"))?
            .pop_if_empty()
            .extend(["users", "me"])
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        target: Target,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ResourceError> {
        let response = self
            .client
            .get(self.endpoint(segments)?)
            .query(query)
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body, target));
        }

        response
            .json()
            .await
            .map_err(|err| ResourceError::malformed(format!("unexpected Gmail response: {err}")))
    }

    async fn list_refs(
        &self,
        token: &AccessToken,
        mut query: Vec<(&str, String)>,
        limit: usize,
    ) -> Result<Vec<GmailMessageRef>, ResourceError> {
        query.push(("maxResults", limit.to_string()));
        let listing: GmailListResponse = self
            .get_json(token, Target::Listing, &["messages"], &query)
            .await?;
        let mut refs = listing.messages.unwrap_or_default();
        refs.truncate(limit);
        Ok(refs)
    }

    async fn fetch_summaries(
        &self,
        token: &AccessToken,
        refs: Vec<GmailMessageRef>,
    ) -> Result<Vec<MessageSummary>, ResourceError> {
        let mut query = vec![("format", "metadata".to_string())];
        query.extend(
            SUMMARY_HEADERS
                .iter()
                .map(|header| ("metadataHeaders", header.to_string())),
        );

        let mut summaries = Vec::with_capacity(refs.len());
        for message_ref in refs {
            let message: GmailMessage = self
                .get_json(
                    token,
                    Target::Message,
                    &["messages", &message_ref.id],
                    &query,
                )
                .await?;
            summaries.push(MessageSummary {
                thread_id: message.thread_id.or(message_ref.thread_id),
                headers: headers_map(message.payload.as_ref()),
                snippet: message.snippet.unwrap_or_default(),
                id: message_ref.id,
            });
        }

        Ok(summaries)
    }

    async fn attachment_preview(
        &self,
        token: &AccessToken,
        message_id: &str,
        attachment_id: &str,
    ) -> Option<String> {
        let segments = ["messages", message_id, "attachments", attachment_id];
        match self
            .get_json::<GmailAttachment>(token, Target::Message, &segments, &[])
            .await
        {
            Ok(attachment) => attachment.data.as_deref().and_then(preview_of),
            Err(error) => {
                tracing::debug!(
                    message_id,
                    attachment_id,
                    error = %error,
                    "attachment preview unavailable"
                );
                None
            }
        }
    }
}

impl Mailbox for GmailMailbox {
    fn list<'a>(
        &'a self,
        filter: &'a MailFilter,
        limit: usize,
    ) -> ResourceFuture<'a, Result<Vec<MessageSummary>, ResourceError>> {
        Box::pin(async move {
            if limit == 0 {
                return Ok(Vec::new());
            }

            let token = self.auth.authorized_handle().await?;
            let refs = self
                .list_refs(
                    &token,
                    vec![("labelIds", filter.label_id().to_string())],
                    limit,
                )
                .await?;
            self.fetch_summaries(&token, refs).await
        })
    }

    fn search<'a>(
        &'a self,
        query: &'a str,
        limit: usize,
    ) -> ResourceFuture<'a, Result<Vec<MessageSummary>, ResourceError>> {
        Box::pin(async move {
            if limit == 0 {
                return Ok(Vec::new());
            }

            let token = self.auth.authorized_handle().await?;
            let refs = self
                .list_refs(&token, vec![("q", query.to_string())], limit)
                .await?;
            self.fetch_summaries(&token, refs).await
        })
    }

    fn get<'a>(
        &'a self,
        id: &'a str,
    ) -> ResourceFuture<'a, Result<MessageDetail, ResourceError>> {
        Box::pin(async move {
            if !is_message_id(id) {
                return Err(ResourceError::not_found(format!("message '{id}' not found")));
            }

            let token = self.auth.authorized_handle().await?;
            let message: GmailMessage = self
                .get_json(
                    &token,
                    Target::Message,
                    &["messages", id],
                    &[("format", "full".to_string())],
                )
                .await?;

            let mut pending = Vec::new();
            if let Some(payload) = message.payload.as_ref() {
                collect_attachments(&payload.parts, &mut pending);
            }

            let mut attachments = Vec::with_capacity(pending.len());
            for mut attachment in pending {
                if attachment.content_preview.is_none()
                    && let Some(attachment_id) = attachment.attachment_id.as_deref()
                {
                    attachment.content_preview =
                        self.attachment_preview(&token, id, attachment_id).await;
                }
                attachments.push(attachment);
            }

            Ok(MessageDetail {
                id: message.id.unwrap_or_else(|| id.to_string()),
                thread_id: message.thread_id,
                headers: headers_map(message.payload.as_ref()),
                body: message
                    .payload
                    .as_ref()
                    .map(extract_text)
                    .unwrap_or_default(),
                snippet: message.snippet.unwrap_or_default(),
                attachments,
            })
        })
    }
}

/// What a request addresses; Gmail answers 400 for malformed message ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Listing,
    Message,
}

/// Gmail ids are URL-safe tokens; anything else cannot name a message.
fn is_message_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}

#[derive(Debug, Deserialize)]
struct GmailListResponse {
    messages: Option<Vec<GmailMessageRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessageRef {
    id: String,
    thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessage {
    id: Option<String>,
    thread_id: Option<String>,
    snippet: Option<String>,
    payload: Option<GmailPart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailPart {
    mime_type: Option<String>,
    filename: Option<String>,
    #[serde(default)]
    headers: Vec<GmailHeader>,
    body: Option<GmailBody>,
    #[serde(default)]
    parts: Vec<GmailPart>,
}

#[derive(Debug, Deserialize)]
struct GmailHeader {
    name: String,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailBody {
    attachment_id: Option<String>,
    size: Option<u64>,
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GmailAttachment {
    data: Option<String>,
}

fn headers_map(payload: Option<&GmailPart>) -> BTreeMap<String, String> {
    payload
        .map(|part| {
            part.headers
                .iter()
                .map(|header| (header.name.clone(), header.value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Concatenates every `text/plain` part, depth first, joined by newlines.
fn extract_text(part: &GmailPart) -> String {
    if part.mime_type.as_deref() == Some("text/plain")
        && let Some(data) = part.body.as_ref().and_then(|body| body.data.as_deref())
    {
        return decode_text(data).unwrap_or_default();
    }

    part.parts
        .iter()
        .map(extract_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_attachments(parts: &[GmailPart], out: &mut Vec<AttachmentSummary>) {
    for part in parts {
        let filename = part.filename.as_deref().unwrap_or_default();
        if let Some(body) = part.body.as_ref()
            && !filename.is_empty()
            && (body.attachment_id.is_some() || body.data.is_some())
        {
            out.push(AttachmentSummary {
                filename: filename.to_string(),
                mime_type: part.mime_type.clone(),
                attachment_id: body.attachment_id.clone(),
                size: body.size,
                content_preview: body.data.as_deref().and_then(preview_of),
            });
        }

        collect_attachments(&part.parts, out);
    }
}

fn decode_text(data: &str) -> Option<String> {
    BASE64URL
        .decode(data.trim())
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

fn preview_of(data: &str) -> Option<String> {
    decode_text(data).map(|text| text.chars().take(ATTACHMENT_PREVIEW_CHARS).collect())
}

fn map_status(status: StatusCode, body: &str, target: Target) -> ResourceError {
    let message = extract_error_message(body)
        .unwrap_or_else(|| format!("Gmail request failed with status {status}"));

    match status {
        StatusCode::NOT_FOUND => ResourceError::not_found(message),
        StatusCode::BAD_REQUEST if target == Target::Message => ResourceError::not_found(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ResourceError::unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => ResourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ResourceError::timeout(message)
        }
        status if status.is_server_error() => ResourceError::unavailable(message),
        _ => ResourceError::other(message),
    }
}

fn map_transport_error(err: reqwest::Error) -> ResourceError {
    if err.is_timeout() {
        ResourceError::timeout(err.to_string())
    } else if err.is_connect() {
        ResourceError::unavailable(err.to_string())
    } else {
        ResourceError::other(err.to_string())
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Envelope {
        error: Detail,
    }

    #[derive(Deserialize)]
    struct Detail {
        message: String,
    }

    serde_json::from_str::<Envelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::json;

    use super::*;
    use crate::ResourceErrorKind;

    fn encode(text: &str) -> String {
        URL_SAFE_NO_PAD.encode(text)
    }

    fn multipart_message() -> GmailMessage {
        serde_json::from_value(json!({
            "id": "18c1",
            "threadId": "t-18c1",
            "snippet": "Numbers attached",
            "payload": {
                "mimeType": "multipart/mixed",
                "headers": [
                    {"name": "From", "value": "alice@example.com"},
                    {"name": "Subject", "value": "Q3"}
                ],
                "parts": [
                    {
                        "mimeType": "multipart/alternative",
                        "parts": [
                            {"mimeType": "text/plain", "body": {"data": encode("Hello team,")}},
                            {"mimeType": "text/html", "body": {"data": encode("<p>Hello team,</p>")}}
                        ]
                    },
                    {"mimeType": "text/plain", "body": {"data": encode("Regards")}},
                    {
                        "mimeType": "text/csv",
                        "filename": "q3.csv",
                        "body": {"attachmentId": "att-9", "size": 2048}
                    },
                    {
                        "mimeType": "text/plain",
                        "filename": "notes.txt",
                        "body": {"data": encode(&"x".repeat(1500)), "size": 1500}
                    }
                ]
            }
        }))
        .expect("fixture should deserialize")
    }

    #[test]
    fn extract_text_joins_nested_plain_parts() {
        let message = multipart_message();
        let payload = message.payload.as_ref().expect("payload");
        let text = extract_text(payload);
        assert!(text.starts_with("Hello team,\nRegards"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn attachments_are_discovered_and_inline_previews_truncated() {
        let message = multipart_message();
        let payload = message.payload.as_ref().expect("payload");
        let mut attachments = Vec::new();
        collect_attachments(&payload.parts, &mut attachments);

        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].filename, "q3.csv");
        assert_eq!(attachments[0].attachment_id.as_deref(), Some("att-9"));
        assert_eq!(attachments[0].content_preview, None);
        assert_eq!(
            attachments[1]
                .content_preview
                .as_ref()
                .map(|preview| preview.chars().count()),
            Some(ATTACHMENT_PREVIEW_CHARS)
        );
    }

    #[test]
    fn decode_accepts_padded_and_unpadded_input() {
        assert_eq!(decode_text("aGk").as_deref(), Some("hi"));
        assert_eq!(decode_text("aGk=").as_deref(), Some("hi"));
        assert_eq!(decode_text("!!!"), None);
    }

    #[test]
    fn status_codes_map_to_resource_error_kinds() {
        let cases = [
            (StatusCode::NOT_FOUND, ResourceErrorKind::NotFound, false),
            (StatusCode::UNAUTHORIZED, ResourceErrorKind::Unauthorized, false),
            (StatusCode::FORBIDDEN, ResourceErrorKind::Unauthorized, false),
            (StatusCode::TOO_MANY_REQUESTS, ResourceErrorKind::RateLimited, true),
            (StatusCode::BAD_GATEWAY, ResourceErrorKind::Unavailable, true),
            (StatusCode::BAD_REQUEST, ResourceErrorKind::Other, false),
        ];

        for (status, kind, retryable) in cases {
            let error = map_status(status, "", Target::Listing);
            assert_eq!(error.kind, kind, "status {status}");
            assert_eq!(error.retryable, retryable, "status {status}");
        }
    }

    #[test]
    fn status_mapping_prefers_api_error_message() {
        let error = map_status(
            StatusCode::NOT_FOUND,
            r#"{"error":{"code":404,"message":"Requested entity was not found."}}"#,
            Target::Message,
        );
        assert_eq!(error.message, "Requested entity was not found.");
    }

    #[test]
    fn bad_request_on_message_fetch_means_not_found() {
        let error = map_status(StatusCode::BAD_REQUEST, "", Target::Message);
        assert_eq!(error.kind, ResourceErrorKind::NotFound);
        assert!(!error.retryable);
    }

    fn local_mailbox() -> GmailMailbox {
        GmailMailbox::new(Arc::new(crate::StaticTokenProvider::new("t")))
            .with_base_url("http://localhost:9000/gmail/v1/")
    }

    #[test]
    fn endpoint_joins_base_and_path() {
        let url = local_mailbox()
            .endpoint(&["messages", "abc"])
            .expect("valid url");
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/gmail/v1/users/me/messages/abc"
        );
    }

    #[test]
    fn endpoint_escapes_message_ids() {
        let mailbox = local_mailbox();
        let url = mailbox
            .endpoint(&["messages", "../labels"])
            .expect("valid url");
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/gmail/v1/users/me/messages/..%2Flabels"
        );

        let url = mailbox
            .endpoint(&["messages", "abc?format=raw#x"])
            .expect("valid url");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[tokio::test]
    async fn malformed_ids_are_not_found_without_a_request() {
        let mailbox = local_mailbox().with_base_url("http://127.0.0.1:1/gmail/v1");
        for id in ["../labels", "abc?format=raw", "..", ""] {
            let error = mailbox.get(id).await.expect_err("not a message id");
            assert_eq!(error.kind, ResourceErrorKind::NotFound, "id {id:?}");
        }
        assert!(is_message_id("18c1f0a9b2e4d6c8"));
    }
}
