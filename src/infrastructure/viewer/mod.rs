// Viewer context - who is making the request

pub mod viewer;

pub use viewer::{AuthMethod, ViewerContext};
