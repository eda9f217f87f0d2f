pub mod domain;
pub mod llm;
pub mod market;
pub mod notify;
pub mod pipeline;
pub mod search;
pub mod tools;

#[cfg(test)]
mod test_http;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    const DEFAULT_SYMBOLS: &[&str] = &["RELIANCE", "TCS", "HDFCBANK", "INFY", "ICICIBANK"];
    const DEFAULT_SYMBOL_DELAY_MS: u64 = 2000;
    const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
    const DEFAULT_SMTP_PORT: u16 = 465;
    const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
    const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-latest";
    const DEFAULT_ANTHROPIC_MAX_TOKENS: u32 = 4096;
    const DEFAULT_ANTHROPIC_TIMEOUT_SECS: u64 = 120;
    const DEFAULT_MARKET_DATA_BASE_URL: &str = "https://stock.indianapi.in";
    const DEFAULT_SEARCH_BASE_URL: &str = "https://api.exa.ai";
    const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub anthropic_api_key: Option<String>,
        pub anthropic_base_url: String,
        pub anthropic_model: String,
        pub anthropic_max_tokens: u32,
        pub anthropic_timeout: Duration,
        pub market_data_api_key: Option<String>,
        pub market_data_base_url: String,
        pub market_data_timeout: Duration,
        pub search_api_key: Option<String>,
        pub search_base_url: String,
        pub search_timeout: Duration,
        pub email_user: Option<String>,
        pub email_pass: Option<String>,
        pub email_recipient: Option<String>,
        pub smtp_host: String,
        pub smtp_port: u16,
        pub cron_secret: Option<String>,
        pub sentry_dsn: Option<String>,
        pub default_symbols: Vec<String>,
        pub symbol_delay: Duration,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                anthropic_api_key: None,
                anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
                anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
                anthropic_max_tokens: DEFAULT_ANTHROPIC_MAX_TOKENS,
                anthropic_timeout: Duration::from_secs(DEFAULT_ANTHROPIC_TIMEOUT_SECS),
                market_data_api_key: None,
                market_data_base_url: DEFAULT_MARKET_DATA_BASE_URL.to_string(),
                market_data_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
                search_api_key: None,
                search_base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
                search_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
                email_user: None,
                email_pass: None,
                email_recipient: None,
                smtp_host: DEFAULT_SMTP_HOST.to_string(),
                smtp_port: DEFAULT_SMTP_PORT,
                cron_secret: None,
                sentry_dsn: None,
                default_symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
                symbol_delay: Duration::from_millis(DEFAULT_SYMBOL_DELAY_MS),
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();

            let smtp_port = parsed_var::<u16>("SMTP_PORT")?.unwrap_or(defaults.smtp_port);
            let symbol_delay = parsed_var::<u64>("SYMBOL_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.symbol_delay);

            let default_symbols = non_empty_var("DEFAULT_SYMBOLS")
                .map(|s| parse_symbol_list(&s))
                .filter(|list| !list.is_empty())
                .unwrap_or(defaults.default_symbols);

            Ok(Self {
                anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
                anthropic_base_url: non_empty_var("ANTHROPIC_BASE_URL")
                    .unwrap_or(defaults.anthropic_base_url),
                anthropic_model: non_empty_var("ANTHROPIC_MODEL").unwrap_or(defaults.anthropic_model),
                anthropic_max_tokens: parsed_var("ANTHROPIC_MAX_TOKENS")?
                    .unwrap_or(defaults.anthropic_max_tokens),
                anthropic_timeout: secs_var("ANTHROPIC_TIMEOUT_SECS")?
                    .unwrap_or(defaults.anthropic_timeout),
                market_data_api_key: non_empty_var("MARKET_DATA_API_KEY"),
                market_data_base_url: non_empty_var("MARKET_DATA_BASE_URL")
                    .unwrap_or(defaults.market_data_base_url),
                market_data_timeout: secs_var("MARKET_DATA_TIMEOUT_SECS")?
                    .unwrap_or(defaults.market_data_timeout),
                search_api_key: non_empty_var("SEARCH_API_KEY"),
                search_base_url: non_empty_var("SEARCH_BASE_URL")
                    .unwrap_or(defaults.search_base_url),
                search_timeout: secs_var("SEARCH_TIMEOUT_SECS")?.unwrap_or(defaults.search_timeout),
                email_user: non_empty_var("EMAIL_USER"),
                email_pass: non_empty_var("EMAIL_PASS"),
                email_recipient: non_empty_var("EMAIL_RECIPIENT"),
                smtp_host: non_empty_var("SMTP_HOST").unwrap_or(defaults.smtp_host),
                smtp_port,
                cron_secret: non_empty_var("CRON_SECRET"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                default_symbols,
                symbol_delay,
            })
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }

        pub fn require_market_data_api_key(&self) -> anyhow::Result<&str> {
            self.market_data_api_key
                .as_deref()
                .context("MARKET_DATA_API_KEY is required")
        }

        pub fn require_search_api_key(&self) -> anyhow::Result<&str> {
            self.search_api_key
                .as_deref()
                .context("SEARCH_API_KEY is required")
        }

        pub fn require_cron_secret(&self) -> anyhow::Result<&str> {
            self.cron_secret
                .as_deref()
                .context("CRON_SECRET is required")
        }

        /// Every credential an analysis run needs before the first outbound call.
        /// Mail credentials are not part of this: a run without them still succeeds.
        pub fn require_analysis_credentials(&self) -> anyhow::Result<()> {
            self.require_anthropic_api_key()?;
            self.require_market_data_api_key()?;
            self.require_search_api_key()?;
            Ok(())
        }
    }

    pub fn parse_symbol_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    fn parsed_var<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        non_empty_var(key)
            .map(|s| {
                s.trim()
                    .parse::<T>()
                    .with_context(|| format!("{key} must be a number (got {s})"))
            })
            .transpose()
    }

    fn secs_var(key: &str) -> anyhow::Result<Option<Duration>> {
        Ok(parsed_var::<u64>(key)?.map(Duration::from_secs))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn parse_symbol_list_keeps_order_and_duplicates() {
            assert_eq!(
                parse_symbol_list(" TCS, INFY,,TCS "),
                vec!["TCS".to_string(), "INFY".to_string(), "TCS".to_string()]
            );
        }

        #[test]
        fn analysis_credentials_name_the_missing_key() {
            let settings = Settings {
                anthropic_api_key: Some("a".to_string()),
                market_data_api_key: Some("m".to_string()),
                ..Settings::default()
            };
            let err = settings.require_analysis_credentials().unwrap_err();
            assert!(err.to_string().contains("SEARCH_API_KEY"));
        }

        #[test]
        fn defaults_pause_two_seconds_between_symbols() {
            let settings = Settings::default();
            assert_eq!(settings.symbol_delay, Duration::from_millis(2000));
            assert!(!settings.default_symbols.is_empty());
        }

        #[test]
        fn provider_defaults_point_at_public_endpoints() {
            let settings = Settings::default();
            assert_eq!(settings.anthropic_base_url, "https://api.anthropic.com");
            assert_eq!(settings.anthropic_max_tokens, 4096);
            assert_eq!(settings.anthropic_timeout, Duration::from_secs(120));
            assert_eq!(settings.market_data_base_url, "https://stock.indianapi.in");
            assert_eq!(settings.search_base_url, "https://api.exa.ai");
            assert_eq!(settings.search_timeout, Duration::from_secs(30));
        }

        #[test]
        fn numeric_tunables_reject_garbage() {
            std::env::set_var("SWINGDESK_TEST_TIMEOUT_SECS", "soon");
            let err = secs_var("SWINGDESK_TEST_TIMEOUT_SECS").unwrap_err();
            assert!(err.to_string().contains("SWINGDESK_TEST_TIMEOUT_SECS"));

            std::env::set_var("SWINGDESK_TEST_TIMEOUT_SECS", " 7 ");
            assert_eq!(
                secs_var("SWINGDESK_TEST_TIMEOUT_SECS").unwrap(),
                Some(Duration::from_secs(7))
            );
            std::env::remove_var("SWINGDESK_TEST_TIMEOUT_SECS");
            assert_eq!(secs_var("SWINGDESK_TEST_TIMEOUT_SECS").unwrap(), None);
        }
    }
}
