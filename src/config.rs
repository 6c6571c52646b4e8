use std::net::SocketAddr;
use std::time::Duration;

use crate::escape::DEFAULT_MAX_ITER;
use crate::label::LabelStyle;
use crate::painter::ColorScheme;

pub const DEFAULT_IMAGE_SIZE: u32 = 1000;
pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("image size must be greater than zero")]
    ZeroImageSize,
    #[error("maximum iterations must be greater than zero")]
    ZeroMaxIter,
    #[error("thread count must be greater than zero")]
    ZeroThreads,
    #[error("render timeout must be greater than zero")]
    ZeroTimeout,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    pub image_size: u32,
    /// Escape-time cap; also sets the period of both color schemes.
    pub max_iter: u32,
    pub color: ColorScheme,
    pub label: LabelStyle,
    pub threads: usize,
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_size == 0 {
            return Err(ConfigError::ZeroImageSize);
        }
        if self.max_iter == 0 {
            return Err(ConfigError::ZeroMaxIter);
        }
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_size: DEFAULT_IMAGE_SIZE,
            max_iter: DEFAULT_MAX_ITER,
            color: ColorScheme::default(),
            label: LabelStyle::default(),
            threads: num_cpus::get_physical(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub render: RenderConfig,
    pub timeout: Duration,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.render.validate()?;
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            render: RenderConfig::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
