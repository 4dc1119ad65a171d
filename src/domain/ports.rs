use crate::domain::messages::{MessageRequest, MessageResponse};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn file_size(&self, path: &str) -> impl std::future::Future<Output = Result<u64>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_key(&self) -> Option<&str>;
    fn api_base_url(&self) -> &str;
    fn model(&self) -> &str;
    fn max_tokens(&self) -> u32;
    fn temperature(&self) -> f32;
    fn request_timeout(&self) -> Duration;
    fn max_retries(&self) -> u32;
    fn retry_base_delay(&self) -> Duration;
    fn max_file_size_mb(&self) -> u64;
    fn allowed_mime_types(&self) -> &[String];
    fn app_version(&self) -> &str;
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn create_message(&self, request: &MessageRequest) -> Result<MessageResponse>;

    fn name(&self) -> &str;
}
