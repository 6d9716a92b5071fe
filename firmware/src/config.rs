//! Compile-time configuration and credential validation
//!
//! WiFi credentials are baked in at build time (see `build.rs`), everything
//! else is a fixed constant of the device.

use core::fmt;

/// Octopus Agile standard unit rates endpoint (region C)
pub const API_URL: &str = "https://api.octopus.energy/v1/products/AGILE-FLEX-22-11-25/electricity-tariffs/E-1R-AGILE-FLEX-22-11-25-C/standard-unit-rates/";

/// Seconds between price refreshes (one Agile period)
pub const REFRESH_INTERVAL_SECS: u64 = 30 * 60;

/// Number of link status polls before giving up on the network
pub const CONNECT_POLL_LIMIT: u32 = 10;

/// Delay between link status polls
pub const CONNECT_POLL_INTERVAL_MS: u32 = 1000;

/// SNTP server used for the one-shot clock sync
pub const NTP_SERVER: &str = "pool.ntp.org";

/// SNTP server port
pub const NTP_PORT: u16 = 123;

/// Maximum SSID length accepted by the radio
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Configuration error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// WIFI_SSID is empty
    EmptySsid,
    /// WIFI_PASS is empty
    EmptyPassword,
    /// SSID longer than the radio accepts
    SsidTooLong,
    /// Passphrase longer than the radio accepts
    PasswordTooLong,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptySsid => f.write_str("WIFI_SSID is empty"),
            ConfigError::EmptyPassword => f.write_str("WIFI_PASS is empty"),
            ConfigError::SsidTooLong => write!(f, "WIFI_SSID exceeds {} bytes", MAX_SSID_LEN),
            ConfigError::PasswordTooLong => {
                write!(f, "WIFI_PASS exceeds {} bytes", MAX_PASSWORD_LEN)
            }
        }
    }
}

/// Validated WiFi credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials<'a> {
    ssid: &'a str,
    password: &'a str,
}

impl<'a> Credentials<'a> {
    /// Validate raw credential strings
    pub fn new(ssid: &'a str, password: &'a str) -> Result<Self, ConfigError> {
        if ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        if password.is_empty() {
            return Err(ConfigError::EmptyPassword);
        }
        if ssid.len() > MAX_SSID_LEN {
            return Err(ConfigError::SsidTooLong);
        }
        if password.len() > MAX_PASSWORD_LEN {
            return Err(ConfigError::PasswordTooLong);
        }
        Ok(Self { ssid, password })
    }

    pub fn ssid(&self) -> &'a str {
        self.ssid
    }

    pub fn password(&self) -> &'a str {
        self.password
    }
}
