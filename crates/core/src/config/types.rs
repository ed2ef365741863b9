use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    pub trade: TradeConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub estimator: Option<EstimatorConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Locations of the bootstrap data files
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// Stat dictionary (`{id, text, type}` entries)
    #[serde(default = "default_modifiers_path")]
    pub modifiers_path: PathBuf,
    /// Base table (`{base, type, influence, ilvl}` entries)
    #[serde(default = "default_bases_path")]
    pub bases_path: PathBuf,
    /// Static bulk exchange ids (optional)
    #[serde(default)]
    pub exchange_path: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            modifiers_path: default_modifiers_path(),
            bases_path: default_bases_path(),
            exchange_path: None,
        }
    }
}

fn default_modifiers_path() -> PathBuf {
    PathBuf::from("data/modifiers.json")
}

fn default_bases_path() -> PathBuf {
    PathBuf::from("data/bases.json")
}

/// Trade API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradeConfig {
    /// League to search in (e.g. "Standard")
    pub league: String,
    /// Trade API root
    #[serde(default = "default_trade_url")]
    pub base_url: String,
    /// Listings fetched per search (1..=10)
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// POESESSID cookie, never echoed back
    #[serde(default)]
    pub session_id: Option<String>,
    /// Search requests per minute
    #[serde(default = "default_search_rpm")]
    pub search_rpm: u32,
    /// Fetch requests per minute
    #[serde(default = "default_fetch_rpm")]
    pub fetch_rpm: u32,
}

impl TradeConfig {
    pub fn new(league: impl Into<String>) -> Self {
        Self {
            league: league.into(),
            base_url: default_trade_url(),
            fetch_limit: default_fetch_limit(),
            timeout_secs: default_timeout(),
            session_id: None,
            search_rpm: default_search_rpm(),
            fetch_rpm: default_fetch_rpm(),
        }
    }
}

fn default_trade_url() -> String {
    "https://www.pathofexile.com/api/trade".to_string()
}

fn default_fetch_limit() -> usize {
    10
}

fn default_timeout() -> u32 {
    30
}

fn default_search_rpm() -> u32 {
    6
}

fn default_fetch_rpm() -> u32 {
    12
}

/// Query shaping options
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
    /// Widen explicit/pseudo values to ±10%
    #[serde(default = "default_true")]
    pub relax_filters: bool,
    /// Fold resistances and life into pseudo totals
    #[serde(default = "default_true")]
    pub aggregate_pseudo: bool,
    /// Currency offered in exchange searches
    #[serde(default = "default_exchange_have")]
    pub exchange_have: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            relax_filters: true,
            aggregate_pseudo: true,
            exchange_have: default_exchange_have(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_exchange_have() -> String {
    "chaos".to_string()
}

/// Fallback price estimator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EstimatorConfig {
    #[serde(default = "default_estimator_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            base_url: default_estimator_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_estimator_url() -> String {
    "https://www.poeprices.info/api".to_string()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub trade: SanitizedTradeConfig,
    pub pricing: PricingConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimator: Option<EstimatorConfig>,
}

/// Sanitized trade config (session id hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTradeConfig {
    pub league: String,
    pub base_url: String,
    pub fetch_limit: usize,
    pub timeout_secs: u32,
    pub session_id_configured: bool,
    pub search_rpm: u32,
    pub fetch_rpm: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let trade = &config.trade;
        Self {
            server: config.server.clone(),
            data: config.data.clone(),
            trade: SanitizedTradeConfig {
                league: trade.league.clone(),
                base_url: trade.base_url.clone(),
                fetch_limit: trade.fetch_limit,
                timeout_secs: trade.timeout_secs,
                session_id_configured: trade
                    .session_id
                    .as_deref()
                    .is_some_and(|s| !s.is_empty()),
                search_rpm: trade.search_rpm,
                fetch_rpm: trade.fetch_rpm,
            },
            pricing: config.pricing.clone(),
            estimator: config.estimator.clone(),
        }
    }
}
