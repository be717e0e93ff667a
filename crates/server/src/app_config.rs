/// Load configuration from `.env` and environment variables.
pub fn load_config() -> kairos_core::Config {
    kairos_core::config::load_dotenv();
    kairos_core::Config::from_env()
}
