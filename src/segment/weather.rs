//! OpenWeatherMap weather segment
//!
//! Fetches current conditions from the OpenWeatherMap API and renders them as
//! `"<glyph> (<temp><unit>)"`. Raw API responses are memoized in the injected
//! `TtlCache`, keyed by request URL minus the API key. The key never reaches the
//! cache file or the logs.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::icons::icon_glyph;
use crate::cache::{Ttl, TtlCache};

/// Base URL for the OpenWeatherMap current weather API
const OWM_BASE_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

/// Upper bound on a single API request, so a slow network cannot stall the prompt
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Measurement system requested from the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    /// Kelvin
    #[default]
    Standard,
    /// Celsius
    Metric,
    /// Fahrenheit
    Imperial,
}

impl Units {
    /// Parses a units name as accepted by the API
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Some(Units::Standard),
            "metric" => Some(Units::Metric),
            "imperial" => Some(Units::Imperial),
            _ => None,
        }
    }

    /// Query parameter value for the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Standard => "standard",
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    /// Temperature suffix shown in the prompt
    pub fn symbol(&self) -> &'static str {
        match self {
            Units::Standard => "°K",
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }
}

/// Settings for the weather segment
#[derive(Debug, Clone)]
pub struct WeatherProps {
    /// OpenWeatherMap API key
    pub api_key: String,
    /// Location query, e.g. "AMSTERDAM,NL"
    pub location: String,
    /// Units for the reported temperature
    pub units: Units,
    /// How long a response stays cached; zero disables caching
    pub cache_timeout: Duration,
}

/// Current conditions needed to render the segment
#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    /// OpenWeatherMap icon code, e.g. "01d"
    pub icon: String,
    /// Temperature in the requested units
    pub temperature: f64,
}

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),
}

/// Client for fetching raw responses from the OpenWeatherMap API
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    /// Create a new WeatherClient with default settings
    ///
    /// Fails if the HTTP backend cannot be initialized.
    pub fn new() -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client))
    }

    /// Create a new WeatherClient with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: OWM_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the request URL for the given settings
    pub fn request_url(&self, props: &WeatherProps) -> String {
        format!("{}&appid={}", self.cache_key(props), props.api_key)
    }

    /// Cache key for the given settings: the request URL without the API key
    pub fn cache_key(&self, props: &WeatherProps) -> String {
        format!(
            "{}?q={}&units={}",
            self.base_url,
            props.location,
            props.units.as_str()
        )
    }

    /// Fetch the raw response body for `url`
    ///
    /// The URL carries the API key, so it is stripped from any returned error.
    pub async fn fetch_raw(&self, url: &str) -> Result<String, WeatherError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(reqwest::Error::without_url)?;

        response
            .text()
            .await
            .map_err(|err| reqwest::Error::without_url(err).into())
    }
}

/// Weather segment backed by the shared response cache
pub struct WeatherSegment<'a> {
    props: WeatherProps,
    client: WeatherClient,
    cache: &'a TtlCache,
}

impl<'a> WeatherSegment<'a> {
    pub fn new(props: WeatherProps, client: WeatherClient, cache: &'a TtlCache) -> Self {
        Self {
            props,
            client,
            cache,
        }
    }

    /// Key under which this segment's responses are cached
    pub fn cache_key(&self) -> String {
        self.client.cache_key(&self.props)
    }

    /// Returns current conditions, served from the cache when possible
    ///
    /// A response is only cached after it parses successfully.
    pub async fn fetch(&self) -> Result<Weather, WeatherError> {
        let key = self.cache_key();
        let caching = !self.props.cache_timeout.is_zero();

        if caching {
            if let Some(body) = self.cache.get(&key) {
                debug!(location = %self.props.location, "Weather cache hit");
                return parse_response(&body);
            }
        }

        debug!(location = %self.props.location, "Fetching weather");
        let url = self.client.request_url(&self.props);
        let body = self.client.fetch_raw(&url).await?;
        let weather = parse_response(&body)?;

        if caching {
            self.cache
                .put(key, body, Ttl::After(self.props.cache_timeout));
        }

        Ok(weather)
    }

    /// Renders the segment text, or `None` if weather data is unavailable
    pub async fn render(&self) -> Option<String> {
        match self.fetch().await {
            Ok(weather) => Some(self.format(&weather)),
            Err(err) => {
                warn!(error = %err, "Weather segment disabled");
                None
            }
        }
    }

    /// Formats conditions as `"<glyph> (<temp><unit>)"`
    pub fn format(&self, weather: &Weather) -> String {
        format!(
            "{} ({}{})",
            icon_glyph(&weather.icon),
            weather.temperature.round() as i64,
            self.props.units.symbol()
        )
    }
}

/// Parse an OpenWeatherMap response body into a Weather struct
pub fn parse_response(body: &str) -> Result<Weather, WeatherError> {
    let response: OwmResponse = serde_json::from_str(body)?;

    let icon = response
        .weather
        .into_iter()
        .next()
        .map(|condition| condition.icon)
        .ok_or_else(|| WeatherError::MissingField("weather".to_string()))?;

    Ok(Weather {
        icon,
        temperature: response.main.temp,
    })
}

/// OpenWeatherMap API response structure
#[derive(Debug, Deserialize)]
struct OwmResponse {
    weather: Vec<OwmCondition>,
    main: OwmMain,
}

/// Single weather condition entry
#[derive(Debug, Deserialize)]
struct OwmCondition {
    icon: String,
}

/// Main measurements block
#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
}
