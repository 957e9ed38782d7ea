use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,

    pub jwt_secret: String,
    pub jwt_cookie_name: String,
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,

    // bootstrap administrator, only created when both are set
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub seed_demo_data: bool,
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn env_non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:webshop.db?mode=rwc".to_string());

    let db_max_connections = env::var("DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(5);

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-dev-secret".to_string());
    let jwt_cookie_name = env::var("JWT_COOKIE_NAME").unwrap_or_else(|_| "auth".to_string());
    let cookie_secure = env_flag("COOKIE_SECURE");

    let bcrypt_cost = env::var("BCRYPT_COST")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(bcrypt::DEFAULT_COST);

    Settings {
        database_url,
        db_max_connections,
        host,
        port,
        jwt_secret,
        jwt_cookie_name,
        cookie_secure,
        bcrypt_cost,
        admin_email: env_non_empty("ADMIN_EMAIL"),
        admin_password: env_non_empty("ADMIN_PASSWORD"),
        seed_demo_data: env_flag("SEED_DEMO_DATA"),
    }
}
