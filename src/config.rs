use serde::Deserialize;

const DAY_SECONDS: u64 = 86_400;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Duration string like "1d" or "12h".
    pub expiration: String,
}

impl JwtConfig {
    pub fn expires_in_seconds(&self) -> u64 {
        parse_expiration(&self.expiration)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            expiration: std::env::var("JWT_EXPIRATION").unwrap_or_else(|_| "1d".into()),
        };
        Ok(Self { database_url, jwt })
    }
}

/// "<n>d" is days, "<n>h" is hours; anything else falls back to one day.
pub(crate) fn parse_expiration(raw: &str) -> u64 {
    if let Some(n) = raw.strip_suffix('d') {
        return n
            .trim()
            .parse::<u64>()
            .map(|n| n * DAY_SECONDS)
            .unwrap_or(DAY_SECONDS);
    }
    if let Some(n) = raw.strip_suffix('h') {
        return n
            .trim()
            .parse::<u64>()
            .map(|n| n * 3_600)
            .unwrap_or(DAY_SECONDS);
    }
    DAY_SECONDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_day() {
        assert_eq!(parse_expiration("1d"), 86_400);
    }

    #[test]
    fn twelve_hours() {
        assert_eq!(parse_expiration("12h"), 43_200);
    }

    #[test]
    fn multi_day() {
        assert_eq!(parse_expiration("7d"), 7 * 86_400);
    }

    #[test]
    fn unrecognized_defaults_to_one_day() {
        assert_eq!(parse_expiration("30m"), 86_400);
        assert_eq!(parse_expiration(""), 86_400);
        assert_eq!(parse_expiration("soon"), 86_400);
    }

    #[test]
    fn unparsable_leading_integer_defaults_to_one_day() {
        assert_eq!(parse_expiration("d"), 86_400);
        assert_eq!(parse_expiration("xd"), 86_400);
        assert_eq!(parse_expiration("1.5h"), 86_400);
    }

    #[test]
    fn config_surfaces_parsed_expiry() {
        let jwt = JwtConfig {
            secret: "s".into(),
            expiration: "12h".into(),
        };
        assert_eq!(jwt.expires_in_seconds(), 43_200);
    }
}
