use crate::domain::ports::RecipeSource;
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use reqwest::Client;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// 從本機 JSON 檔讀取原始資料
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl RecipeSource for FileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch(&self) -> Result<String> {
        tracing::debug!("Reading raw recipes from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(content)
    }
}

/// 呼叫遠端 API 一次取得原始資料，不重試
pub struct HttpSource {
    client: Client,
    endpoint: String,
    headers: HashMap<String, String>,
    parameters: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl HttpSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            headers: HashMap::new(),
            parameters: HashMap::new(),
            timeout: None,
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_parameters(mut self, parameters: HashMap<String, String>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait::async_trait]
impl RecipeSource for HttpSource {
    fn describe(&self) -> String {
        format!("endpoint {}", self.endpoint)
    }

    async fn fetch(&self) -> Result<String> {
        let mut request = self.client.get(&self.endpoint);

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        if !self.parameters.is_empty() {
            request = request.query(&self.parameters);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Making API request to: {}", self.endpoint);
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(EtlError::SourceError {
                message: format!("{} responded with HTTP {}", self.endpoint, status),
            });
        }

        Ok(response.text().await?)
    }
}

/// 去掉語言模型常見的 ```json ... ``` 包裝
pub fn strip_code_fences(raw: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\r?\n?\s*```\s*$")
            .expect("code fence pattern is valid")
    });

    match fence.captures(raw).and_then(|caps| caps.get(1)) {
        Some(body) => body.as_str().trim(),
        None => raw.trim(),
    }
}

/// 取得並解析原始 JSON 文件
pub async fn fetch_document(source: &dyn RecipeSource) -> Result<serde_json::Value> {
    let raw = source.fetch().await?;
    let cleaned = strip_code_fences(&raw);
    if cleaned.is_empty() {
        return Err(EtlError::SourceError {
            message: format!("{} returned an empty document", source.describe()),
        });
    }
    Ok(serde_json::from_str(cleaned)?)
}
