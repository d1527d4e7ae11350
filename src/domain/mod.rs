// Domain layer - Plain data and pure rules
pub mod format;
pub mod frame;
pub mod message;
pub mod quote;
pub mod synthetic;
