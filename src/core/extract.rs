use crate::domain::model::DocumentKind;
use crate::utils::error::ExtractionError;

/// 把一份已知類型的文件轉成 Unicode 文字。
///
/// 內容為空不算錯誤，只有容器本身無法解析時才回傳 `ExtractionError`。
pub fn extract(kind: DocumentKind, bytes: &[u8]) -> Result<String, ExtractionError> {
    match kind {
        DocumentKind::PlainText => Ok(decode_plain_text(bytes)),
        DocumentKind::Pdf => extract_pdf(bytes),
    }
}

/// 先試 UTF-8，失敗再用 Latin-1；Latin-1 每個位元組都合法，所以不會失敗。
pub fn decode_plain_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            tracing::debug!(
                "UTF-8 decoding failed at byte {}, falling back to Latin-1",
                e.valid_up_to()
            );
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    // pdf-extract 遇到某些損壞的檔案會 panic，這裡一併轉成 ExtractionError
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| ExtractionError::Pdf("parser aborted on malformed document".to_string()))?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    let total = pages.len();
    let kept: Vec<String> = pages
        .into_iter()
        .filter(|page| !page.trim().is_empty())
        .collect();

    tracing::debug!("PDF pages with text: {}/{}", kept.len(), total);

    Ok(kept.join("\n"))
}
