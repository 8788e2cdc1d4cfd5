//! Configuração do stitchsort carregada a partir de `stitchsort.toml`.
//!
//! A struct [`StitchsortConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `OPENAI_API_KEY` tem precedência sobre o arquivo.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Configuração de nível superior carregada de `stitchsort.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct StitchsortConfig {
    /// Chave da API OpenAI.
    #[serde(default)]
    pub api_key: String,

    /// Modelo de visão usado para classificar as imagens.
    #[serde(default = "default_model")]
    pub model: String,

    /// Timeout por requisição à API, em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Máximo de tentativas de classificação por imagem.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Atraso base em milissegundos para backoff progressivo.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Largura máxima da imagem renderizada, em pixels.
    #[serde(default = "default_image_width")]
    pub image_width: u32,

    /// Altura máxima da imagem renderizada, em pixels.
    #[serde(default = "default_image_height")]
    pub image_height: u32,

    /// Caminho do log diagnóstico (uma linha por item processado).
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Sinônimos extras para o registro de categorias
    /// (rótulo bruto → chave canônica, ex.: `rosas = "flowers"`).
    #[serde(default)]
    pub synonyms: HashMap<String, String>,
}

// Valor padrão para o modelo de visão.
fn default_model() -> String {
    "gpt-4o".to_string()
}

// Valor padrão para o timeout por requisição: 30s.
fn default_request_timeout_secs() -> u64 {
    30
}

// Valor padrão para tentativas máximas: 3.
fn default_max_retries() -> u32 {
    3
}

// Valor padrão para o atraso base: 1000ms.
fn default_base_delay_ms() -> u64 {
    1000
}

fn default_image_width() -> u32 {
    800
}

fn default_image_height() -> u32 {
    600
}

fn default_log_file() -> String {
    "logs/stitchsort.log".to_string()
}

impl Default for StitchsortConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            image_width: default_image_width(),
            image_height: default_image_height(),
            log_file: default_log_file(),
            synonyms: HashMap::new(),
        }
    }
}

impl StitchsortConfig {
    /// Carrega a configuração de `stitchsort.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("stitchsort.toml"))
    }

    /// Carrega a configuração de um caminho específico.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<StitchsortConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo de configuração para a chave API.
        if let Ok(key) = std::env::var("OPENAI_API_KEY")
            && !key.is_empty()
        {
            config.api_key = key;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = StitchsortConfig::default();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay_ms, 1000);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.image_width, 800);
        assert_eq!(config.image_height, 600);
        assert_eq!(config.log_file, "logs/stitchsort.log");
        assert!(config.api_key.is_empty());
        assert!(config.synonyms.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_key = "sk-test-123"
            max_retries = 5

            [synonyms]
            rosas = "flowers"
        "#;
        let config: StitchsortConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key, "sk-test-123");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_delay_ms, 1000);
        assert_eq!(config.synonyms.get("rosas").unwrap(), "flowers");
    }

    #[test]
    fn load_from_missing_file_falls_back_to_defaults() {
        let config = StitchsortConfig::load_from(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(config.max_retries, 3);
    }
}
