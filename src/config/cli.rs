use crate::domain::model::RawInput;
use crate::domain::ports::DocumentSource;
use crate::utils::error::Result;
use std::path::Path;

/// 從本機檔案系統讀取 --file 指定的文件
#[derive(Debug, Clone)]
pub struct LocalDocumentSource {
    base_path: String,
}

impl LocalDocumentSource {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    /// 讀檔並包成與 HTTP 上傳相同的輸入，檔名只保留最後一段
    pub async fn load(&self, path: &str) -> Result<RawInput> {
        let bytes = self.read_file(path).await?;
        let filename = Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        tracing::debug!("Read {} bytes from {}", bytes.len(), filename);
        Ok(RawInput::document(filename, bytes))
    }
}

impl Default for LocalDocumentSource {
    fn default() -> Self {
        Self::new(".".to_string())
    }
}

impl DocumentSource for LocalDocumentSource {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }
}
