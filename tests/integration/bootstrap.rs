//! Fleet bootstrap over mock discovery

use aqi_duck::{
    bootstrap::{ChannelDiscovery, subscribe, subscribe_all},
    controller::MonitorState,
    error::{AqiError, AqiResult},
    reporter::ReportingChannel,
};
use assert_matches::assert_matches;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::Arc;

use crate::helpers::*;

#[tokio::test]
async fn test_each_channel_gets_its_own_report() {
    let a = RecordingChannel::new("CA", "channel-a", Some("Config A"));
    let b = RecordingChannel::new("CB", "channel-b", Some("Config B"));
    let discovery = MockDiscovery {
        channels: vec![a.clone(), b.clone()],
    };

    let controllers = subscribe_all(&discovery, &MockFactory, TEST_INTERVAL).await;

    assert_eq!(controllers.len(), 2);
    assert!(
        controllers
            .iter()
            .all(|c| c.state() == MonitorState::Idle)
    );
    assert_eq!(a.take(), vec![report_for("Config A")]);
    assert_eq!(b.take(), vec![report_for("Config B")]);
}

#[tokio::test]
async fn test_broken_channels_are_skipped() {
    let good = RecordingChannel::new("CG", "good", Some("Config G"));
    let unconfigured = RecordingChannel::new("CU", "unconfigured", None);
    let malformed = RecordingChannel::new("CM", "malformed", Some("malformed"));
    let discovery = MockDiscovery {
        channels: vec![unconfigured.clone(), good.clone(), malformed.clone()],
    };

    let controllers = subscribe_all(&discovery, &MockFactory, TEST_INTERVAL).await;

    let ids: Vec<&str> = controllers
        .iter()
        .map(|c| c.channel().channel_id())
        .collect();
    assert_eq!(ids, vec!["CG"]);

    assert_eq!(good.take(), vec![report_for("Config G")]);
    assert!(unconfigured.take().is_empty());
    assert!(malformed.take().is_empty());
}

#[tokio::test]
async fn test_subscribe_reports_configuration_errors() {
    let channel = RecordingChannel::new("CU", "unconfigured", None);

    let result = subscribe(channel, &MockFactory, TEST_INTERVAL).await;

    assert_matches!(result, Err(AqiError::MalformedConfiguration(_)));
}

#[tokio::test]
async fn test_discovery_failure_is_contained() {
    struct FailingDiscovery;

    #[async_trait]
    impl ChannelDiscovery for FailingDiscovery {
        async fn discover(&self) -> AqiResult<Vec<Arc<dyn ReportingChannel>>> {
            Err(AqiError::SlackApi {
                method: "users.conversations".to_string(),
                error: "invalid_auth".to_string(),
            })
        }
    }

    let controllers = subscribe_all(&FailingDiscovery, &MockFactory, TEST_INTERVAL).await;

    assert!(controllers.is_empty());
}

#[tokio::test]
async fn test_no_channels_is_not_an_error() {
    let discovery = MockDiscovery { channels: vec![] };

    let controllers = subscribe_all(&discovery, &MockFactory, TEST_INTERVAL).await;

    assert!(controllers.is_empty());
}
