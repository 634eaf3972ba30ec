//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Client configuration

use crate::ConfigError;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Default Minecraft RCON port
pub const DEFAULT_RCON_PORT: u16 = 25575;

/// Default RCON host
pub const DEFAULT_RCON_HOST: &str = "localhost";

/// Where and how to reach an RCON server.
///
/// The password is never printed by [`fmt::Debug`] or [`fmt::Display`].
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
    password: String,
}

impl Endpoint {
    /// Create a new endpoint
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
        }
    }

    /// Server hostname or IP address
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Server RCON port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// RCON password
    pub fn password(&self) -> &str {
        &self.password
    }

    /// `host:port`, used as the cursor key and in log fields
    pub fn key(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_RCON_HOST, DEFAULT_RCON_PORT, "")
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// RCON client configuration
#[derive(Debug, Clone)]
pub struct RconConfig {
    /// Server to connect to
    pub endpoint: Endpoint,

    /// Bound on establishing the TCP connection
    pub connect_timeout: Duration,

    /// Bound on each request/response round trip, authentication included
    pub read_timeout: Duration,

    /// Attempts made by [`RconClient::connect`](crate::RconClient::connect)
    pub connect_attempts: u32,

    /// Pause between failed connect attempts
    pub connect_backoff: Duration,
}

impl Default for RconConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            connect_attempts: 3,
            connect_backoff: Duration::from_secs(30),
        }
    }
}

impl RconConfig {
    /// Create a new configuration for the given server
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::new(host, port, password),
            ..Default::default()
        }
    }

    /// Set the endpoint
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the number of connect attempts
    pub fn with_connect_attempts(mut self, attempts: u32) -> Self {
        self.connect_attempts = attempts;
        self
    }

    /// Set the pause between connect attempts
    pub fn with_connect_backoff(mut self, backoff: Duration) -> Self {
        self.connect_backoff = backoff;
        self
    }

    /// Build a configuration from `KEY=VALUE` lines.
    ///
    /// Recognised keys are `MC_HOST`, `MC_RCON_PORT` and `MC_RCON_PASSWORD`.
    /// Unknown keys and lines without `=` are ignored, and missing keys keep
    /// their defaults.
    pub fn from_properties(text: &str) -> Result<Self, ConfigError> {
        let mut host = DEFAULT_RCON_HOST.to_string();
        let mut port = DEFAULT_RCON_PORT;
        let mut password = String::new();

        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "MC_HOST" => host = value.to_string(),
                "MC_RCON_PORT" => {
                    port = value
                        .parse()
                        .map_err(|_| ConfigError::InvalidPort(value.to_string()))?;
                }
                "MC_RCON_PASSWORD" => password = value.to_string(),
                _ => {}
            }
        }

        Ok(Self::new(host, port, password))
    }

    /// Load a configuration from a properties file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_properties(&text)?;
        debug!(path = %path.display(), endpoint = %config.endpoint, "Loaded RCON configuration");
        Ok(config)
    }
}

/// Reconnect supervisor configuration
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Pause before each reconnect round
    pub retry_interval: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_secs(300),
        }
    }
}

impl SupervisorConfig {
    /// Create a default supervisor configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pause before each reconnect round
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }
}
