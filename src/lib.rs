// MindAura - Mental-wellness chat service
// Library exports

pub mod analysis; // Keyword conversation classifier
pub mod config;
pub mod conversation;
pub mod crisis;
pub mod errors;
pub mod responder; // Chat reply generation and streaming
pub mod server; // HTTP service
