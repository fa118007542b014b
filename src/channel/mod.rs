pub mod handler;
pub mod text;

pub use handler::HandlerChannel;
pub use text::TextChannel;
pub use crate::core::Channel;
