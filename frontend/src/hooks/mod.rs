pub mod use_mounted;
pub mod use_notifications;

pub use use_mounted::use_mounted;
pub use use_notifications::{use_notifications, PollConfig};
