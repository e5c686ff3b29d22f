//! Централизованная конфигурация для agility-core
//!
//! Всё, что вызывающий код может переопределить без пересборки, живёт здесь:
//! политика выбора бэкенда, длина AEAD-тега по умолчанию и схема паддинга.

use crate::crypto::padding::PaddingScheme;
use crate::crypto::registry::ResolutionPolicy;
use crate::error::{CryptoError, Result};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

/// Глобальная конфигурация (синглтон)
static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

pub const ENV_RESOLUTION_POLICY: &str = "AGILITY_RESOLUTION_POLICY";
pub const ENV_DEFAULT_TAG_LENGTH: &str = "AGILITY_DEFAULT_TAG_LENGTH";
pub const ENV_DEFAULT_PADDING: &str = "AGILITY_DEFAULT_PADDING";

/// Основная структура конфигурации
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ============================================
    // РЕЕСТР
    // ============================================

    /// Как выбирать запись, когда одну и ту же возможность объявили
    /// несколько бэкендов
    pub resolution_policy: ResolutionPolicy,

    // ============================================
    // ШИФРЫ
    // ============================================

    /// Длина AEAD-тега (в байтах) для `Registry::cipher_with_defaults`
    pub default_tag_length: usize,

    /// Схема паддинга для `Registry::cipher_with_defaults`
    pub default_padding: PaddingScheme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolution_policy: ResolutionPolicy::FirstRegistered,
            default_tag_length: 16,
            default_padding: PaddingScheme::Pkcs7,
        }
    }
}

impl Config {
    /// Создать конфигурацию из переменных окружения
    ///
    /// Нераспознанные значения игнорируются (остаётся значение по умолчанию).
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var(ENV_RESOLUTION_POLICY) {
            match val.parse() {
                Ok(parsed) => config.resolution_policy = parsed,
                Err(e) => warn!(target: "crypto::config", var = ENV_RESOLUTION_POLICY, error = %e, "Ignoring value"),
            }
        }

        if let Ok(val) = std::env::var(ENV_DEFAULT_TAG_LENGTH) {
            match val.trim().parse::<usize>() {
                Ok(parsed) if parsed > 0 => config.default_tag_length = parsed,
                _ => warn!(target: "crypto::config", var = ENV_DEFAULT_TAG_LENGTH, value = %val, "Ignoring value"),
            }
        }

        if let Ok(val) = std::env::var(ENV_DEFAULT_PADDING) {
            match val.parse() {
                Ok(parsed) => config.default_padding = parsed,
                Err(e) => warn!(target: "crypto::config", var = ENV_DEFAULT_PADDING, error = %e, "Ignoring value"),
            }
        }

        config
    }

    /// Разобрать конфигурацию из JSON; отсутствующие поля берутся по умолчанию
    ///
    /// # Errors
    ///
    /// `ConfigError`, если JSON некорректен или значения вне допустимых пределов
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_tag_length == 0 {
            return Err(CryptoError::ConfigError(
                "default_tag_length must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Получить глобальный экземпляр конфигурации
    ///
    /// Автоматически инициализирует конфигурацию со значениями по умолчанию при первом вызове
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(Config::default)
    }

    /// Инициализировать глобальную конфигурацию со значениями по умолчанию
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init() -> Result<()> {
        Self::init_with(Self::default())
    }

    /// Инициализировать глобальную конфигурацию из переменных окружения
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_from_env() -> Result<()> {
        Self::init_with(Self::from_env())
    }

    /// Инициализировать глобальную конфигурацию с кастомным экземпляром
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_with(config: Config) -> Result<()> {
        config.validate()?;
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| CryptoError::ConfigError("Config already initialized".to_string()))
    }

    /// Проверить, инициализирована ли глобальная конфигурация
    pub fn is_initialized() -> bool {
        GLOBAL_CONFIG.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.resolution_policy, ResolutionPolicy::FirstRegistered);
        assert_eq!(config.default_tag_length, 16);
        assert_eq!(config.default_padding, PaddingScheme::Pkcs7);
    }

    #[test]
    fn test_from_json_full() {
        let config = Config::from_json(
            r#"{
                "resolution_policy": "implementation-rank",
                "default_tag_length": 16,
                "default_padding": "iso7816-4"
            }"#,
        )
        .unwrap();
        assert_eq!(config.resolution_policy, ResolutionPolicy::ImplementationRank);
        assert_eq!(config.default_padding, PaddingScheme::Iso7816);
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let config = Config::from_json(r#"{ "default_padding": "none" }"#).unwrap();
        assert_eq!(config.default_padding, PaddingScheme::None);
        assert_eq!(config.default_tag_length, 16);
        assert_eq!(config.resolution_policy, ResolutionPolicy::FirstRegistered);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            Config::from_json("not json"),
            Err(CryptoError::ConfigError(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{ "default_padding": "zeros" }"#),
            Err(CryptoError::ConfigError(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{ "default_tag_length": 0 }"#),
            Err(CryptoError::ConfigError(_))
        ));
    }

    #[test]
    fn test_global_is_stable() {
        let first = Config::global() as *const Config;
        let second = Config::global() as *const Config;
        assert_eq!(first, second);
        assert!(Config::is_initialized());
        // Повторная инициализация запрещена
        assert!(Config::init().is_err());
    }
}
