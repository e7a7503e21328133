use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::schemas::comment_resource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub log_filter: String,
    /// Insert demo users, posts and comments at startup
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Page size of the comment collection
    pub comments_per_page: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/blog_comments.db".to_string(),
                max_connections: 5,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            api: ApiConfig {
                comments_per_page: comment_resource().items_per_page,
            },
            log_filter: "blog_comments=info,tower_http=info".to_string(),
            seed_demo_data: false,
        }
    }
}

fn parse_var<T>(name: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, value)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let comments_per_page = parse_var(
            "COMMENTS_PER_PAGE",
            lookup("COMMENTS_PER_PAGE"),
            defaults.api.comments_per_page,
        )?;
        if comments_per_page == 0 {
            bail!("COMMENTS_PER_PAGE must be at least 1");
        }

        Ok(Self {
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_var(
                    "DATABASE_MAX_CONNECTIONS",
                    lookup("DATABASE_MAX_CONNECTIONS"),
                    defaults.database.max_connections,
                )?,
            },
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", lookup("SERVER_PORT"), defaults.server.port)?,
            },
            api: ApiConfig { comments_per_page },
            log_filter: lookup("RUST_LOG").unwrap_or(defaults.log_filter),
            seed_demo_data: parse_var(
                "SEED_DEMO_DATA",
                lookup("SEED_DEMO_DATA"),
                defaults.seed_demo_data,
            )?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
