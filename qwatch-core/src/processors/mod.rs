//! Pipeline stages for the feed-watching session.
//!
//! - `fetcher`: HTTP access to the USGS summary feeds and GeoJSON decoding
//! - `reconciler`: seen-registry bookkeeping and snapshot ordering
//! - `classifier`: alert tier decisions for newly observed events
//! - `notifier`: banner, audio and title-flash delivery with cancellable timers
//! - `scheduler`: the control loop that drives all of the above

pub mod classifier;
pub mod fetcher;
pub mod notifier;
pub mod reconciler;
pub mod scheduler;

pub use classifier::{classify, Classification, DEFAULT_REGIONAL_RADIUS_KM, GLOBAL_MAGNITUDE_THRESHOLD};
pub use fetcher::{FeedSource, FetchError, UsgsFeedSource};
pub use notifier::{CueError, NotificationController, NotificationSink};
pub use reconciler::{ReconcileOutcome, Reconciler, SeenRegistry};
pub use scheduler::PollScheduler;
