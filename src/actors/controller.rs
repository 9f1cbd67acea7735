//! ControllerActor - gives every controller a single owner
//!
//! Mentions for one channel arrive from the events endpoint concurrently.
//! The actor takes them off an mpsc queue one at a time, so a controller's
//! state machine is never driven from two places at once.

use anyhow::{Context, Result};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, warn};

use crate::controller::{Controller, MonitorState};

use super::messages::ControllerCommand;

pub struct ControllerActor {
    controller: Controller,

    command_rx: mpsc::Receiver<ControllerCommand>,

    /// Channel name for logging
    channel_name: String,
}

impl ControllerActor {
    pub fn new(controller: Controller, command_rx: mpsc::Receiver<ControllerCommand>) -> Self {
        let channel_name = controller.channel().channel_name().to_string();
        Self {
            controller,
            command_rx,
            channel_name,
        }
    }

    #[instrument(skip(self), fields(channel = %self.channel_name))]
    pub async fn run(mut self) {
        debug!("starting controller actor");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                ControllerCommand::Mention { text } => {
                    self.controller.handle_app_mention(&text).await;
                }
                ControllerCommand::StartMonitoring => {
                    self.controller.monitor_and_notify();
                }
                ControllerCommand::GetState { respond_to } => {
                    let _ = respond_to.send(self.controller.state());
                }
                ControllerCommand::Shutdown => {
                    debug!("received shutdown command");
                    break;
                }
            }
        }

        // never leave a timer ticking for a controller nobody can reach
        if self.controller.stop_monitoring().await {
            warn!("monitoring cancelled on shutdown");
        }

        debug!("controller actor stopped");
    }
}

/// Commands a controller actor can have queued before new mentions are
/// turned away
pub const MAILBOX_CAPACITY: usize = 32;

/// Handle for sending commands to a controller actor
#[derive(Clone)]
pub struct ControllerHandle {
    sender: mpsc::Sender<ControllerCommand>,

    /// Platform id of the channel, used to route mentions
    channel_id: String,

    channel_name: String,
}

impl ControllerHandle {
    pub fn spawn(controller: Controller) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(MAILBOX_CAPACITY);

        let channel_id = controller.channel().channel_id().to_string();
        let channel_name = controller.channel().channel_name().to_string();

        let actor = ControllerActor::new(controller, cmd_rx);

        tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            channel_id,
            channel_name,
        }
    }

    /// Queue a mention without waiting; replies go straight to the
    /// channel.
    ///
    /// Fails when the actor is gone or already has [`MAILBOX_CAPACITY`]
    /// commands waiting.
    pub fn mention(&self, text: impl Into<String>) -> Result<()> {
        match self
            .sender
            .try_send(ControllerCommand::Mention { text: text.into() })
        {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                anyhow::bail!("mention queue of {} is full", self.channel_name)
            }
            Err(TrySendError::Closed(_)) => {
                anyhow::bail!("controller for {} has stopped", self.channel_name)
            }
        }
    }

    pub async fn start_monitoring(&self) -> Result<()> {
        self.sender
            .send(ControllerCommand::StartMonitoring)
            .await
            .context("failed to send StartMonitoring command")?;
        Ok(())
    }

    /// Current state, after every command queued before this call
    pub async fn state(&self) -> Result<MonitorState> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(ControllerCommand::GetState { respond_to: tx })
            .await
            .context("failed to send GetState command")?;

        rx.await.context("failed to receive response")
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(ControllerCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }
}
