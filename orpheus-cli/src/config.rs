//! Configuration module
//!
//! Handles CLI configuration including the console URL.

use orpheus_client::ConsoleClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the console service
    pub console_url: String,
}

impl Config {
    pub fn client(&self) -> ConsoleClient {
        ConsoleClient::new(&self.console_url)
    }
}
