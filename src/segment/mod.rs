//! Prompt segments
//!
//! Segments fetch their data through an injected `TtlCache` so that repeated prompt
//! draws reuse earlier responses instead of hitting the network.

pub mod icons;
pub mod weather;

pub use icons::icon_glyph;
pub use weather::{Units, Weather, WeatherClient, WeatherError, WeatherProps, WeatherSegment};
