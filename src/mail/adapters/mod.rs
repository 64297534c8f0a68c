//! Adapter implementations for mail ports.

mod background;
mod log;
mod recording;
mod template;

pub use background::BackgroundMailDispatcher;
pub use log::LogTransport;
pub use recording::{RecordingMailDispatcher, SentMail};
pub use template::TemplateMailer;
