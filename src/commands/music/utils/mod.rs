// Export music utilities
pub mod announcer;
pub mod event_handlers;
pub mod messages;
pub mod music_manager;
pub mod session;
pub mod songbird_voice;
pub mod voice;
