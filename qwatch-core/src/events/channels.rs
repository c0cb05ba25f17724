//! Event channel factories and handles.
//!
//! Factory functions for the pipeline's channels, with one shared buffer
//! size. Mirrors the flow: app → `PollTrigger` → scheduler →
//! `SnapshotUpdate` → renderer and `AlertNotice` → notification controller.

use super::types::{AlertNotice, PollTrigger, SnapshotUpdate};
use tokio::sync::mpsc;

/// Default buffer size for event channels.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for PollTrigger events.
pub type PollTriggerSender = mpsc::Sender<PollTrigger>;
/// Receiver handle for PollTrigger events.
pub type PollTriggerReceiver = mpsc::Receiver<PollTrigger>;

/// Sender handle for SnapshotUpdate events.
pub type SnapshotUpdateSender = mpsc::Sender<SnapshotUpdate>;
/// Receiver handle for SnapshotUpdate events.
pub type SnapshotUpdateReceiver = mpsc::Receiver<SnapshotUpdate>;

/// Sender handle for AlertNotice events.
pub type AlertNoticeSender = mpsc::Sender<AlertNotice>;
/// Receiver handle for AlertNotice events.
pub type AlertNoticeReceiver = mpsc::Receiver<AlertNotice>;

/// Create a new PollTrigger channel.
pub fn poll_trigger_channel() -> (PollTriggerSender, PollTriggerReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new SnapshotUpdate channel.
pub fn snapshot_update_channel() -> (SnapshotUpdateSender, SnapshotUpdateReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new AlertNotice channel.
pub fn alert_notice_channel() -> (AlertNoticeSender, AlertNoticeReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
