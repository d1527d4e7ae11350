// Application layer - Use cases and the seams to the outside world
pub mod display;
pub mod market_data;
pub mod message_service;
pub mod rotation;
pub mod tiles;
