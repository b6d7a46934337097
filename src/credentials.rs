//! FedEx web service credentials.

use anyhow::{Context, Result};
use log::debug;
use std::fmt;
use std::str::FromStr;

pub const TEST_URL: &str = "https://wsbeta.fedex.com:443/xml";
pub const PRODUCTION_URL: &str = "https://ws.fedex.com:443/xml";

/// Which FedEx environment the credentials belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Test,
    Production,
}

impl Mode {
    pub fn endpoint(self) -> &'static str {
        match self {
            Mode::Test => TEST_URL,
            Mode::Production => PRODUCTION_URL,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Test => write!(f, "test"),
            Mode::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "test" | "development" => Ok(Mode::Test),
            "production" => Ok(Mode::Production),
            _ => anyhow::bail!("Unknown mode: {}. Expected test or production.", s),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub key: String,
    pub password: String,
    pub account_number: String,
    pub meter: String,
    pub mode: Mode,
}

// Keeps the key and password out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &mask(&self.key))
            .field("password", &"********")
            .field("account_number", &self.account_number)
            .field("meter", &self.meter)
            .field("mode", &self.mode)
            .finish()
    }
}

impl Credentials {
    /// Reads `FEDEX_KEY`, `FEDEX_PASSWORD`, `FEDEX_ACCOUNT_NUMBER`,
    /// `FEDEX_METER` and the optional `FEDEX_MODE` from the process
    /// environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Credentials::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Missing required environment variable {}", name))
        };

        let mode = match lookup("FEDEX_MODE") {
            Some(mode) if !mode.trim().is_empty() => mode.trim().parse()?,
            _ => Mode::default(),
        };

        let credentials = Self {
            key: required("FEDEX_KEY")?,
            password: required("FEDEX_PASSWORD")?,
            account_number: required("FEDEX_ACCOUNT_NUMBER")?,
            meter: required("FEDEX_METER")?,
            mode,
        };

        debug!("Loaded credentials: {:?}", credentials);
        Ok(credentials)
    }
}

fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
