use secrecy::SecretString;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub passing_score: f64,
    pub max_questions_per_attempt: i32,
    pub certificate_code_salt: SecretString,
    pub pdf_renderer_url: String,
    pub pdf_renderer_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "dengue-watch-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            passing_score: env::var("QUIZ_PASSING_SCORE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(80.0),
            max_questions_per_attempt: env::var("QUIZ_MAX_QUESTIONS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(50),
            certificate_code_salt: SecretString::from(
                env::var("CERTIFICATE_CODE_SALT")
                    .unwrap_or_else(|_| "dev_certificate_salt_change_in_production".to_string()),
            ),
            pdf_renderer_url: env::var("PDF_RENDERER_URL")
                .unwrap_or_else(|_| "http://localhost:9090/render".to_string()),
            pdf_renderer_timeout_secs: env::var("PDF_RENDERER_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let salt = self.certificate_code_salt.expose_secret();

        if salt == "dev_certificate_salt_change_in_production" {
            panic!(
                "FATAL: CERTIFICATE_CODE_SALT is using default value! Set CERTIFICATE_CODE_SALT environment variable to a secure random string."
            );
        }

        if salt.len() < 16 {
            panic!(
                "FATAL: CERTIFICATE_CODE_SALT is too short ({}). Must be at least 16 characters.",
                salt.len()
            );
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "dengue-watch-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            passing_score: 80.0,
            max_questions_per_attempt: 50,
            certificate_code_salt: SecretString::from("test_certificate_salt".to_string()),
            pdf_renderer_url: "http://localhost:9090/render".to_string(),
            pdf_renderer_timeout_secs: 2,
        }
    }
}
