use std::env;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expire_days: i64,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "./.db/memory_blocks.db".to_string()),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_expire_days: env::var("JWT_EXPIRE_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .expect("JWT_EXPIRE_DAYS must be a valid number"),
            cors_origin: env::var("CORS_ORIGIN").ok(),
        }
    }
}
