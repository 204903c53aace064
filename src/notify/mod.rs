//! Notification module

mod discord;

pub use self::discord::DiscordNotifier;
