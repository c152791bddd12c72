//! Receipt extraction client
//!
//! Sends a purchase receipt photo to an OpenAI-compatible vision model
//! and parses the structured answer. Known stock item names are passed
//! along so the model reconciles label variations back to the names the
//! ledger already uses.

use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::models::ExtractedReceipt;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Client for the receipt extraction model
#[derive(Clone)]
pub struct ReceiptVisionClient {
    api_endpoint: String,
    api_key: String,
    model: String,
    http_client: Client,
}

/// Chat completion response envelope
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize, Serialize)]
struct ChatMessage {
    content: String,
}

impl ReceiptVisionClient {
    /// Create a new receipt vision client
    pub fn new(api_endpoint: String, api_key: String, model: String) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_endpoint,
            api_key,
            model,
            http_client,
        }
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &Config) -> AppResult<Self> {
        if config.vision.api_key.is_empty() {
            return Err(AppError::Configuration(
                "vision.api_key is not set".to_string(),
            ));
        }
        Ok(Self::new(
            config.vision.api_endpoint.clone(),
            config.vision.api_key.clone(),
            config.vision.model.clone(),
        ))
    }

    /// Extract structured purchase data from a receipt image.
    pub async fn extract_receipt(
        &self,
        image: &[u8],
        known_items: &[String],
    ) -> AppResult<ExtractedReceipt> {
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image);
        let prompt = build_prompt(known_items);

        let payload = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": prompt},
                    {"type": "image_url", "image_url": {
                        "url": format!("data:image/jpeg;base64,{}", image_base64)
                    }}
                ]
            }],
            "max_tokens": 1000,
            "temperature": 0.1
        });

        let response = self
            .http_client
            .post(&self.api_endpoint)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::VisionError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::VisionError(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::VisionError(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| AppError::VisionError("Model returned no choices".to_string()))?;

        parse_receipt_json(content)
    }
}

/// Strip markdown fences the model may wrap its JSON in, then parse.
fn parse_receipt_json(content: &str) -> AppResult<ExtractedReceipt> {
    let cleaned = content.replace("```json", "").replace("```", "");
    serde_json::from_str(cleaned.trim())
        .map_err(|e| AppError::VisionError(format!("Malformed extraction JSON: {}", e)))
}

fn build_prompt(known_items: &[String]) -> String {
    let items_context = if known_items.is_empty() {
        String::new()
    } else {
        let list = known_items
            .iter()
            .map(|item| format!("'{}'", item))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "\nCONTEXTO DE ESTOQUE:\n\
             O usuário já possui os seguintes itens no estoque: [{}].\n\
             Ao extrair o nome de um item da nota, verifique se ele corresponde a algum item desta lista.\n\
             Se for o mesmo produto (mesmo com pequena variação de nome na nota), USE O NOME DA LISTA DE ESTOQUE.\n",
            list
        )
    };

    format!(
        "Você é um especialista em OCR de notas fiscais de alimentos.\n\
         Analise esta imagem. Extraia:\n\
         1. Nome do Estabelecimento.\n\
         2. Data da emissão (Formato YYYY-MM-DD). Se não achar, use hoje.\n\
         3. Lista de itens. Para cada item:\n\
         {}\n\
         - Nome: Se não encontrou no contexto de estoque, REMOVA marca para normalizar, \
         EXCETO se for marca relevante (Doritos, Coca-Cola).\n\n\
         - Unidade e Qtd:\n\
           Extraia: 'count' (qtd itens) e 'unit_size' (tamanho unitário base G/ML).\n\
           Se Unidade for 'UN', unit_size = 1.\n\n\
         - Valor TOTAL pago (líquido).\n\n\
         Retorne APENAS um JSON:\n\
         {{\n\
             \"store\": \"Nome\",\n\
             \"date\": \"YYYY-MM-DD\",\n\
             \"total_receipt\": 0.00,\n\
             \"items\": [\n\
                 {{\"name\": \"LEITE INTEGRAL\", \"count\": 7.0, \"unit_size\": 1000.0, \"unit\": \"ML\", \"total\": 34.93}}\n\
             ]\n\
         }}",
        items_context
    )
}
