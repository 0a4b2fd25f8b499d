use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub pagination: PaginationConfig,
    pub media: MediaConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub capacity: usize,
    /// Lifetime of the cached home page, in seconds
    pub index_ttl_secs: u64,
}

impl CacheConfig {
    pub fn index_ttl(&self) -> Duration {
        Duration::from_secs(self.index_ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub posts_per_page: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub login_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/yatube.db".to_string(),
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            cache: CacheConfig {
                capacity: 1000,
                index_ttl_secs: 20,
            },
            pagination: PaginationConfig { posts_per_page: 10 },
            media: MediaConfig {
                root: "media".to_string(),
            },
            auth: AuthConfig {
                login_url: "/auth/login/".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let config = Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(defaults.server.port),
            },
            cache: CacheConfig {
                capacity: env::var("CACHE_CAPACITY")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()
                    .unwrap_or(defaults.cache.capacity),
                index_ttl_secs: env::var("INDEX_CACHE_TTL_SECS")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .unwrap_or(defaults.cache.index_ttl_secs),
            },
            pagination: PaginationConfig {
                posts_per_page: env::var("POSTS_PER_PAGE")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(defaults.pagination.posts_per_page),
            },
            media: MediaConfig {
                root: env::var("MEDIA_ROOT").unwrap_or(defaults.media.root),
            },
            auth: AuthConfig {
                login_url: env::var("LOGIN_URL").unwrap_or(defaults.auth.login_url),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.pagination.posts_per_page == 0 {
            anyhow::bail!("POSTS_PER_PAGE must be greater than zero");
        }
        if self.cache.capacity == 0 {
            anyhow::bail!("CACHE_CAPACITY must be greater than zero");
        }
        if !self.auth.login_url.starts_with('/') {
            anyhow::bail!("LOGIN_URL must be an absolute path");
        }
        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pagination.posts_per_page, 10);
        assert_eq!(config.cache.index_ttl(), Duration::from_secs(20));
        assert_eq!(config.server_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let mut config = Config::default();
        config.pagination.posts_per_page = 0;
        assert!(config.validate().is_err());
    }
}
