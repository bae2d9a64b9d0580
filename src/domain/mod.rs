// Domain layer: 查詢模型與 ports，不依賴 HTTP 實作

pub mod model;
pub mod ports;
