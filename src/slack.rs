use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, trace};

use crate::bootstrap::ChannelDiscovery;
use crate::error::{AqiError, AqiResult};
use crate::reporter::{ReportingChannel, validate_payload};

/// Marks the configuration region inside a channel topic.
pub const CONFIG_DELIMITER: &str = "***";

/// Configuration embedded in a topic: the text between the first and the
/// second delimiter.
///
/// ```text
/// "Air quality *** Backyard=1234, 5678 *** ask me for a report"
///                 └──────── config ────┘
/// ```
pub fn extract_topic_config(topic: &str) -> Option<&str> {
    let mut parts = topic.split(CONFIG_DELIMITER);
    parts.next()?;
    let config = parts.next()?;
    // the closing delimiter must be present
    parts.next()?;

    Some(config.trim()).filter(|config| !config.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Topic {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub topic: Topic,
}

#[derive(Debug, Deserialize)]
struct ConversationsPage {
    #[serde(default)]
    channels: Vec<ChannelSummary>,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Debug, Deserialize)]
struct ConversationInfo {
    channel: ChannelInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostMessage<'a> {
    pub channel: &'a str,
    pub text: &'a str,
}

/// Thin client for the Slack Web API
///
/// Constructed once from configuration and shared by every channel.
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: Client,
    token: String,
    api_url: String,
    silent: bool,
}

impl SlackClient {
    pub fn new(token: impl ToString, api_url: impl ToString, silent: bool) -> AqiResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            token: token.to_string(),
            api_url: api_url.to_string().trim_end_matches('/').to_string(),
            silent,
        })
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.api_url, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, request: RequestBuilder) -> AqiResult<T> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        let body: Value = response.json().await?;

        if !body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            let error = body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("unexpected response ({status})"));
            return Err(AqiError::SlackApi {
                method: method.to_string(),
                error,
            });
        }

        serde_json::from_value(body).map_err(|e| AqiError::SlackApi {
            method: method.to_string(),
            error: format!("failed to parse response: {e}"),
        })
    }

    /// Every conversation the bot is a member of
    #[instrument(skip(self))]
    pub async fn user_conversations(&self) -> AqiResult<Vec<ChannelSummary>> {
        let mut channels = Vec::new();
        let mut cursor = String::new();

        loop {
            let mut request = self.client.get(self.url("users.conversations")).query(&[
                ("types", "public_channel,private_channel"),
                ("exclude_archived", "true"),
                ("limit", "200"),
            ]);
            if !cursor.is_empty() {
                request = request.query(&[("cursor", cursor.as_str())]);
            }

            let page: ConversationsPage = self.call("users.conversations", request).await?;
            channels.extend(page.channels);

            cursor = page
                .response_metadata
                .map(|meta| meta.next_cursor)
                .unwrap_or_default();
            if cursor.is_empty() {
                break;
            }
            trace!("fetching next page of conversations");
        }

        Ok(channels)
    }

    #[instrument(skip(self))]
    pub async fn conversation_info(&self, channel_id: &str) -> AqiResult<ChannelInfo> {
        let request = self
            .client
            .get(self.url("conversations.info"))
            .query(&[("channel", channel_id)]);

        let info: ConversationInfo = self.call("conversations.info", request).await?;
        Ok(info.channel)
    }

    #[instrument(skip(self, text))]
    pub async fn post_message(&self, channel_id: &str, text: &str) -> AqiResult<()> {
        let request = self
            .client
            .post(self.url("chat.postMessage"))
            .json(&PostMessage {
                channel: channel_id,
                text,
            });

        self.call::<Value>("chat.postMessage", request)
            .await
            .map(|_| ())
            .map_err(|e| AqiError::DeliveryFailed(e.to_string()))
    }
}

/// A single Slack channel as a reporting destination
#[derive(Debug, Clone)]
pub struct SlackChannel {
    client: Arc<SlackClient>,
    info: ChannelInfo,
}

impl SlackChannel {
    pub fn new(client: Arc<SlackClient>, info: ChannelInfo) -> Self {
        Self { client, info }
    }
}

#[async_trait]
impl ReportingChannel for SlackChannel {
    async fn post_message(&self, text: &str) -> AqiResult<()> {
        let text = validate_payload(text)?;

        if self.client.is_silent() {
            info!("Would post to {}:\n{}", self.info.name, text);
            return Ok(());
        }

        self.client.post_message(&self.info.id, text).await?;
        info!("Message posted in {}!", self.info.name);
        Ok(())
    }

    fn channel_name(&self) -> &str {
        &self.info.name
    }

    fn channel_id(&self) -> &str {
        &self.info.id
    }

    async fn config(&self) -> AqiResult<String> {
        extract_topic_config(&self.info.topic.value)
            .map(str::to_string)
            .ok_or_else(|| {
                AqiError::MalformedConfiguration(format!(
                    "no config for channel {} (topic: '{}')",
                    self.info.name, self.info.topic.value
                ))
            })
    }
}

/// Discovers the channels the bot is a member of
#[derive(Debug, Clone)]
pub struct SlackDiscovery {
    client: Arc<SlackClient>,
}

impl SlackDiscovery {
    pub fn new(client: Arc<SlackClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChannelDiscovery for SlackDiscovery {
    #[instrument(skip(self))]
    async fn discover(&self) -> AqiResult<Vec<Arc<dyn ReportingChannel>>> {
        let summaries = self.client.user_conversations().await?;
        debug!("bot is a member of {} conversations", summaries.len());

        let infos = join_all(
            summaries
                .iter()
                .map(|summary| self.client.conversation_info(&summary.id)),
        )
        .await;

        let channels = summaries
            .iter()
            .zip(infos)
            .filter_map(|(summary, info)| match info {
                Ok(info) => Some(Arc::new(SlackChannel::new(self.client.clone(), info))
                    as Arc<dyn ReportingChannel>),
                Err(e) => {
                    error!("failed to fetch info for channel {}: {}", summary.id, e);
                    None
                }
            })
            .collect();

        Ok(channels)
    }
}
