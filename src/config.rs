use validator::Validate;

#[derive(Deserialize, Debug, Validate)]
pub struct Config {
    database_url: String,
    api_host: Option<String>,
    api_port: Option<u16>,
    /// maximum amount of pooled database connections
    #[validate(range(min = 1, max = 64))]
    #[serde(default = "default_pool_size")]
    database_pool_size: u32,
    /// origin of the web ui, any origin is allowed when unset
    allowed_origin: Option<String>,
    sentry_dsn: Option<String>,
}

fn default_pool_size() -> u32 {
    10
}

lazy_static! {
    static ref CONFIG: Config = match envy::from_env::<Config>() {
        Ok(config) => {
            match config.validate() {
                Ok(()) => config,
                Err(e) => panic!("invalid environment variable: {}", e),
            }
        }
        Err(error) => panic!("Missing or incorrect environment variable: {}", error),
    };
}

impl Config {
    /// Forces the environment to be parsed, so configuration errors show up at startup
    pub fn init() {
        lazy_static::initialize(&CONFIG);
    }

    pub fn database_url() -> &'static str {
        CONFIG.database_url.as_ref()
    }

    pub fn api_host() -> &'static str {
        match &CONFIG.api_host {
            Some(host) => host.as_ref(),
            None => "localhost",
        }
    }

    pub fn api_port() -> u16 {
        CONFIG.api_port.unwrap_or(8080)
    }

    pub fn database_pool_size() -> u32 {
        CONFIG.database_pool_size
    }

    pub fn allowed_origin() -> Option<&'static str> {
        CONFIG.allowed_origin.as_ref().map(|origin| origin.as_ref())
    }

    pub fn sentry_dsn() -> Option<&'static str> {
        CONFIG.sentry_dsn.as_ref().map(|dsn| dsn.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(vars: Vec<(&str, &str)>) -> Result<Config, envy::Error> {
        envy::from_iter(
            vars.into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        )
    }

    #[test]
    fn defaults_are_applied() {
        let config = parse(vec![("DATABASE_URL", "postgres://localhost/picklefuif")]).unwrap();

        assert_eq!(config.database_pool_size, 10);
        assert!(config.api_port.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn database_url_is_required() {
        assert!(parse(vec![("API_PORT", "8080")]).is_err());
    }

    #[test]
    fn pool_size_is_bounded() {
        let config = parse(vec![
            ("DATABASE_URL", "postgres://localhost/picklefuif"),
            ("DATABASE_POOL_SIZE", "0"),
        ])
        .unwrap();

        assert!(config.validate().is_err());
    }
}
