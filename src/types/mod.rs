// Linkshelf shared type definitions
// Each submodule defines types used across the service.

pub mod bookmark;
pub mod errors;
pub mod rule;
pub mod settings;
