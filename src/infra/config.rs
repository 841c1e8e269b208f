use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use time::Duration;
use url::Url;

pub struct AppConfig {
    pub jwt_secret: SecretString,
    pub access_token_ttl: Duration,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Absent means ROI projections never call the text-generation API and
    /// always use the arithmetic path.
    pub cohere_api_key: Option<SecretString>,
    pub cohere_api_url: Url,
    pub cohere_model: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret: SecretString = SecretString::new(get_env::<String>("JWT_SECRET").into());

        let access_token_ttl_secs: i64 = get_env_default("ACCESS_TOKEN_TTL_SECS", 86_400);

        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let database_url: String = get_env("DATABASE_URL");
        let db_max_connections: u32 = get_env_default("DB_MAX_CONNECTIONS", 5);

        let cohere_api_key: Option<SecretString> = std::env::var("COHERE_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .map(|key| SecretString::new(key.into()));
        let cohere_api_url: Url = get_env_default(
            "COHERE_API_URL",
            "https://api.cohere.com/v2/chat".parse().unwrap(),
        );
        let cohere_model: String = get_env_default("COHERE_MODEL", "command-r".to_string());

        Self {
            jwt_secret,
            access_token_ttl: Duration::seconds(access_token_ttl_secs),
            cors_origin,
            bind_addr,
            database_url,
            db_max_connections,
            cohere_api_key,
            cohere_api_url,
            cohere_model,
        }
    }
}
