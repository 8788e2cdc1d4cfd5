//! Tipos de dados para requisições e respostas da API OpenAI Chat Completions.
//!
//! Todas as structs derivam `Serialize` e `Deserialize` para conversão JSON
//! conforme o formato esperado pelo endpoint `v1/chat/completions`, incluindo
//! as partes de conteúdo de imagem usadas pelos modelos de visão.

use serde::{Deserialize, Serialize};

/// Corpo da requisição para o endpoint `/v1/chat/completions`.
///
/// Contém o modelo desejado, o limite de tokens, a temperatura e a lista
/// de mensagens que compõem a conversa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Identificador do modelo a ser usado (ex.: "gpt-4o").
    pub model: String,
    /// Número máximo de tokens na resposta gerada pelo modelo.
    pub max_tokens: u32,
    /// Temperatura de amostragem. Baixa para respostas consistentes.
    pub temperature: f32,
    /// Lista de mensagens compondo a conversa.
    pub messages: Vec<ChatMessage>,
}

/// Uma única mensagem em uma conversa com a API OpenAI.
///
/// O conteúdo é uma lista de partes, permitindo misturar texto e imagens
/// na mesma mensagem (necessário para classificação por visão).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Papel do remetente: "user", "assistant" ou "system".
    pub role: String,
    /// Partes de conteúdo da mensagem (texto e/ou imagem).
    pub content: Vec<ContentPart>,
}

/// Uma parte de conteúdo de uma mensagem — texto ou imagem.
///
/// Serializada com o campo discriminador `"type"` conforme o formato
/// da API ("text" ou "image_url").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Parte textual da mensagem.
    Text { text: String },
    /// Parte de imagem, referenciada por URL (ou data URL em base64).
    ImageUrl { image_url: ImageUrl },
}

/// Referência de imagem dentro de uma mensagem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    /// URL da imagem. Para imagens locais, uma data URL base64.
    pub url: String,
    /// Nível de detalhe da análise ("low" economiza tokens).
    pub detail: String,
}

/// Resposta retornada pelo endpoint `/v1/chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Identificador único da resposta (gerado pela API).
    pub id: String,
    /// Modelo que gerou a resposta.
    pub model: String,
    /// Alternativas de resposta geradas (normalmente uma).
    pub choices: Vec<Choice>,
    /// Estatísticas de uso de tokens.
    pub usage: Usage,
}

impl ChatResponse {
    /// Conteúdo textual da primeira alternativa, se houver.
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// Uma alternativa de resposta do modelo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    /// Mensagem gerada pelo modelo.
    pub message: ResponseMessage,
    /// Motivo da parada da geração (ex.: "stop", "length").
    pub finish_reason: Option<String>,
}

/// Mensagem dentro de uma alternativa de resposta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Papel do remetente (normalmente "assistant").
    pub role: String,
    /// Conteúdo textual da resposta. `None` em respostas vazias.
    pub content: Option<String>,
}

/// Estatísticas de consumo de tokens para uma chamada à API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumidos no prompt.
    pub prompt_tokens: u32,
    /// Tokens gerados na resposta.
    pub completion_tokens: u32,
    /// Total de tokens da chamada.
    pub total_tokens: u32,
}
