//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults. Missing Azure OpenAI endpoint or deployment is a
//! startup-time fatal error; everything else has a default.

use std::env;

use crate::error::AppError;

/// Default API version sent to the Azure OpenAI endpoint when
/// `AZURE_OPENAI_API_VERSION` is not set
pub const DEFAULT_API_VERSION: &str = "2024-02-15-preview";

/// Default persona text prepended as the system message of every request
pub const DEFAULT_PERSONA: &str = "Eres Amigo, un coach motivador y cercano que combina la calidez latina \
con expertise en salud y bienestar. Usas un lenguaje cercano y coloquial, pero siempre profesional; \
incorporas dichos y expresiones populares latinos cuando es apropiado; tienes sentido del humor y \
mantienes un tono optimista. Adaptas recetas tradicionales para hacerlas más saludables sin perder \
sabor, sugieres ejercicios que se pueden hacer en casa y promueves cambios graduales y sostenibles, \
no dietas restrictivas. Motivas desde el amor propio y la salud, no desde la vergüenza, siempre \
respetando la identidad cultural y las circunstancias personales de cada persona.";

/// Default welcome message logged for new sessions
pub const DEFAULT_WELCOME: &str = "¡Hola! 👋 ¡Qué gusto conocerte! Soy Amigo, tu compañero personal en este \
viaje hacia una vida más saludable. No vengo a quitarte tus platos favoritos ni a imponerte rutinas \
imposibles - ¡vengo a ayudarte a encontrar ese balance perfecto entre lo delicioso y lo saludable! \
Cuéntame, ¿qué te gustaría lograr?";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Azure OpenAI completion endpoint configuration
    pub openai: OpenAiConfig,
    /// Conversation store configuration
    pub store: StoreConfig,
    /// Chat persona configuration
    pub chat: ChatConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Azure OpenAI completion endpoint configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base endpoint URL (e.g. `https://my-resource.openai.azure.com`)
    pub endpoint: String,
    /// Chat model deployment name
    pub deployment: String,
    /// API version query parameter
    pub api_version: String,
}

/// Conversation store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file holding the conversation log
    pub db_path: String,
}

/// Chat persona configuration
///
/// Both texts are opaque strings as far as the relay is concerned.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// System message prepended to every assembled prompt
    pub persona: String,
    /// Assistant greeting inserted (and logged) for new sessions
    pub welcome: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns `AppError::Configuration` if `AZURE_OPENAI_ENDPOINT` or
    /// `AZURE_OPENAI_CHAT_DEPLOYMENT` is unset or empty.
    pub fn from_env() -> Result<Self, AppError> {
        let endpoint = require_env("AZURE_OPENAI_ENDPOINT")?;
        let deployment = require_env("AZURE_OPENAI_CHAT_DEPLOYMENT")?;

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            openai: OpenAiConfig {
                endpoint,
                deployment,
                api_version: env::var("AZURE_OPENAI_API_VERSION")
                    .ok()
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            },
            store: StoreConfig {
                db_path: env::var("CHAT_DB_PATH")
                    .unwrap_or_else(|_| "./data/chatlog.db".to_string()),
            },
            chat: ChatConfig {
                persona: env::var("CHAT_PERSONA")
                    .ok()
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_PERSONA.to_string()),
                welcome: env::var("CHAT_WELCOME")
                    .ok()
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_WELCOME.to_string()),
            },
        })
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Read a required environment variable, rejecting empty values
fn require_env(name: &str) -> Result<String, AppError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Configuration(format!("{} is required", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "AZURE_OPENAI_ENDPOINT",
            "AZURE_OPENAI_CHAT_DEPLOYMENT",
            "AZURE_OPENAI_API_VERSION",
            "CHAT_PERSONA",
            "CHAT_WELCOME",
            "CHAT_DB_PATH",
            "PORT",
            "HOST",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn missing_endpoint_is_fatal() {
        clear_env();
        env::set_var("AZURE_OPENAI_CHAT_DEPLOYMENT", "gpt-4o");

        let result = Config::from_env();
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    #[serial]
    fn missing_deployment_is_fatal() {
        clear_env();
        env::set_var("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com");

        let result = Config::from_env();
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    #[serial]
    fn defaults_applied_when_optional_vars_absent() {
        clear_env();
        env::set_var("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com");
        env::set_var("AZURE_OPENAI_CHAT_DEPLOYMENT", "gpt-4o");

        let config = Config::from_env().expect("config should load");
        assert_eq!(config.openai.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.chat.persona, DEFAULT_PERSONA);
        assert_eq!(config.chat.welcome, DEFAULT_WELCOME);
        assert_eq!(config.server.port, 8080);
    }
}
