pub mod chat;
pub mod medibot;
pub mod render;
