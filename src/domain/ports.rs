use crate::domain::model::{LookupOutcome, LookupRequest};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// 單一國家的假日查詢。實作不得回傳錯誤，所有失敗都放進 `LookupOutcome::Failure`。
#[async_trait]
pub trait HolidayLookup: Send + Sync {
    async fn check(&self, request: &LookupRequest, cancel: &CancellationToken) -> LookupOutcome;
}
