// Adapters layer: concrete implementations for external systems (remote APIs, timers).

pub mod clock;
pub mod http;
