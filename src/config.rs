use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mongo: MongoConfig,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
    /// Deployment mode, `development` turns on per-request logging.
    pub env: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mongo = MongoConfig {
            uri: std::env::var("MONGO_URI").context("MONGO_URI must be set")?,
            database: std::env::var("MONGO_DB").unwrap_or_else(|_| "accounts".into()),
        };
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "accounts-api".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "accounts-api-users".into()),
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        };
        Ok(Self {
            mongo,
            jwt,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_port(std::env::var("PORT").ok().as_deref()),
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "production".into()),
        })
    }

    pub fn request_logging(&self) -> bool {
        self.env == "development"
    }
}

fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|v| v.trim().parse::<u16>().ok()).unwrap_or(5000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_falls_back_when_unset_or_garbage() {
        assert_eq!(parse_port(None), 5000);
        assert_eq!(parse_port(Some("not-a-port")), 5000);
        assert_eq!(parse_port(Some(" 8080 ")), 8080);
    }
}
