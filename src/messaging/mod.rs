pub mod config;
pub mod publisher;


pub use config::LiveFeedConfig;
pub use publisher::{LiveStream, LiveSubscription, LiveUpdatePublisher, PublisherError};
