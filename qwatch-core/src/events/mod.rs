//! Event system for the polling pipeline.
//!
//! # Event Flow
//!
//! 1. interval tick / `PollTrigger` -> `PollScheduler`
//! 2. `PollScheduler` runs fetch -> reconcile -> classify
//! 3. `PollScheduler` emits `SnapshotUpdate` -> renderer
//! 4. `PollScheduler` emits `AlertNotice` -> `NotificationController`

pub mod channels;
pub mod types;

pub use channels::{
    alert_notice_channel, poll_trigger_channel, snapshot_update_channel, AlertNoticeReceiver,
    AlertNoticeSender, PollTriggerReceiver, PollTriggerSender, SnapshotUpdateReceiver,
    SnapshotUpdateSender, DEFAULT_CHANNEL_BUFFER,
};

pub use types::{AlertNotice, PollTrigger, SnapshotUpdate};
