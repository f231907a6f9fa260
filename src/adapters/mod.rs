// Adapters layer: concrete implementations for external systems (holiday sources, http).

pub mod holidays;
pub mod http;
