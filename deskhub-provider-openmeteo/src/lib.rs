//! deskhub-provider-openmeteo - current weather from Open-Meteo (no API key)

pub mod codes;
pub mod weather;

pub use codes::describe;
pub use weather::OpenMeteoSource;
