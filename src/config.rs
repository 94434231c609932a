pub struct Config {
    pub database_url: String,
    pub token: String,
    pub api_url: String,
    pub gateway_url: String,
    pub bot_user_id: Option<String>,
    pub confirm_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:invistat.db?mode=rwc".to_string()),
            token: std::env::var("INVISTAT_TOKEN").expect("INVISTAT_TOKEN is required"),
            api_url: std::env::var("INVISTAT_API_URL")
                .unwrap_or_else(|_| "https://platform.local/api/v1".to_string()),
            gateway_url: std::env::var("INVISTAT_GATEWAY_URL")
                .unwrap_or_else(|_| "wss://platform.local/gateway".to_string()),
            bot_user_id: std::env::var("INVISTAT_BOT_USER").ok(),
            confirm_timeout_secs: std::env::var("INVISTAT_CONFIRM_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}
