use crate::core::mapping::FieldMapping;
use crate::domain::model::TransformResult;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 原始資料的來源（本機檔案或遠端 API），每次執行只呼叫一次
#[async_trait]
pub trait RecipeSource: Send + Sync {
    fn describe(&self) -> String;
    async fn fetch(&self) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidRecordPolicy {
    /// 任何記錄缺少標題就整批失敗
    #[default]
    Fail,
    /// 略過不合格的記錄，其餘照常輸出
    Skip,
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn output_filename(&self) -> &str;
    fn field_mapping(&self) -> &FieldMapping;
    fn invalid_record_policy(&self) -> InvalidRecordPolicy;
    fn pretty_output(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<serde_json::Value>;
    async fn transform(&self, raw: serde_json::Value) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
