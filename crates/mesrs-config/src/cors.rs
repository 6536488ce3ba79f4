/// Origins of the dashboard front-end during development (Vite, then a
/// static server).
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

/// Origins allowed to call the API with credentials, from `ALLOWED_ORIGINS`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        let raw = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string());
        Self::from_list(&raw)
    }

    /// Comma separated, blanks and trailing slashes dropped.
    pub fn from_list(raw: &str) -> Self {
        let allowed_origins = raw
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/'))
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Self { allowed_origins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origins_are_normalized() {
        let config = CorsConfig::from_list(" https://tableau.mesrs.gov.mr/ ,, http://localhost:5173");
        assert_eq!(
            config.allowed_origins,
            ["https://tableau.mesrs.gov.mr", "http://localhost:5173"]
        );
    }

    #[test]
    fn test_default_list() {
        assert_eq!(
            CorsConfig::from_list(DEFAULT_ALLOWED_ORIGINS).allowed_origins.len(),
            2
        );
    }
}
