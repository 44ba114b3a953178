use super::config::ClientConfig;
use crate::error::TransportError;
use crate::schema::SelectionResponse;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Body of one execute call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub api_name: String,
    pub parameters: Map<String, Value>,
    pub environment: String,
}

/// Success envelope of an execute call. A reply without `output` means no
/// output, stored as the empty string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExecuteResponse {
    #[serde(default = "empty_output")]
    pub output: Value,
    #[serde(default)]
    pub float_fields: Vec<String>,
}

impl Default for ExecuteResponse {
    fn default() -> Self {
        Self {
            output: empty_output(),
            float_fields: Vec::new(),
        }
    }
}

fn empty_output() -> Value {
    Value::String(String::new())
}

/// The two backend calls the engine makes. Implementations must report any
/// non-2xx reply as an error rather than a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn select_environment(
        &self,
        environment: &str,
        interface: &str,
    ) -> Result<SelectionResponse, TransportError>;

    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, TransportError>;
}

/// [`Transport`] over JSON `POST` requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("could not build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Value, TransportError> {
        log::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn select_environment(
        &self,
        environment: &str,
        interface: &str,
    ) -> Result<SelectionResponse, TransportError> {
        let body = json!({ "environment": environment, "interface": interface });
        let reply = self.post(&self.config.select_url(), &body).await?;
        serde_json::from_value(reply).map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, TransportError> {
        let reply = self.post(&self.config.execute_url(), request).await?;
        serde_json::from_value(reply).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
