use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Hex-encoded 32-byte key for the email cipher. Length is checked
    /// where the cipher is built; a bad key aborts startup.
    pub email_key_hex: String,
    pub verification_base_url: String,
    pub frontend_origin: String,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            access_secret: std::env::var("JWT_ACCESS_SECRET")?,
            refresh_secret: std::env::var("JWT_REFRESH_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "tabletop-forum".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "tabletop-forum-users".into()),
            access_ttl_minutes: std::env::var("JWT_ACCESS_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(5),
            refresh_ttl_days: std::env::var("JWT_REFRESH_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };
        let mail = MailConfig {
            smtp_host: std::env::var("SMTP_HOST")?,
            smtp_username: std::env::var("SMTP_USERNAME")?,
            smtp_password: std::env::var("SMTP_PASSWORD")?,
            from_address: std::env::var("MAIL_FROM")?,
        };
        Ok(Self {
            database_url,
            jwt,
            email_key_hex: std::env::var("EMAIL_ENC_KEY")?,
            verification_base_url: std::env::var("VERIFICATION_BASE_URL")?,
            frontend_origin: std::env::var("FRONTEND_ORIGIN")?,
            mail,
        })
    }
}
