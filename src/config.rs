use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Movie table (movieId, title, genres)
    #[serde(default = "default_movies_path")]
    pub movies_path: PathBuf,

    /// Rating table (userId, movieId, rating)
    #[serde(default = "default_ratings_path")]
    pub ratings_path: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Explicit shrinkage pseudo-count. Derived from the rating counts when unset.
    #[serde(default)]
    pub bayes_m: Option<u32>,

    /// Users that must have rated both movies before a correlation is reported
    #[serde(default = "default_min_common_raters")]
    pub min_common_raters: usize,

    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    #[serde(default = "default_max_top_n")]
    pub max_top_n: usize,
}

fn default_movies_path() -> PathBuf {
    PathBuf::from("movies.csv")
}

fn default_ratings_path() -> PathBuf {
    PathBuf::from("ratings.csv")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_min_common_raters() -> usize {
    crate::services::similarity::DEFAULT_MIN_COMMON_RATERS
}

fn default_top_n() -> usize {
    5
}

fn default_max_top_n() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            movies_path: default_movies_path(),
            ratings_path: default_ratings_path(),
            host: default_host(),
            port: default_port(),
            bayes_m: None,
            min_common_raters: default_min_common_raters(),
            default_top_n: default_top_n(),
            max_top_n: default_max_top_n(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Resolves a requested result size against the configured bounds
    pub fn resolve_top_n(&self, requested: Option<usize>) -> crate::error::AppResult<usize> {
        let top_n = requested.unwrap_or(self.default_top_n);
        if top_n == 0 || top_n > self.max_top_n {
            return Err(crate::error::AppError::InvalidInput(format!(
                "top_n must be between 1 and {}, got {}",
                self.max_top_n, top_n
            )));
        }
        Ok(top_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_env() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.movies_path, PathBuf::from("movies.csv"));
        assert_eq!(config.ratings_path, PathBuf::from("ratings.csv"));
        assert_eq!(config.port, 3000);
        assert_eq!(config.bayes_m, None);
        assert_eq!(config.min_common_raters, 5);
        assert_eq!(config.default_top_n, 5);
        assert_eq!(config.max_top_n, 20);
    }

    #[test]
    fn test_overrides_from_env() {
        let vars = vec![
            ("MOVIES_PATH".to_string(), "/data/movies.csv".to_string()),
            ("BAYES_M".to_string(), "25".to_string()),
            ("PORT".to_string(), "8080".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.movies_path, PathBuf::from("/data/movies.csv"));
        assert_eq!(config.bayes_m, Some(25));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_resolve_top_n() {
        let config = Config::default();
        assert_eq!(config.resolve_top_n(None).unwrap(), 5);
        assert_eq!(config.resolve_top_n(Some(20)).unwrap(), 20);
        assert!(config.resolve_top_n(Some(0)).is_err());
        assert!(config.resolve_top_n(Some(21)).is_err());
    }
}
