//! API Gateway プロキシイベントを受け取り、DynamoDB 上の ToDo コレクションに対する
//! CRUD 操作へ振り分ける Lambda ハンドラー

pub mod error;
pub mod request;
pub mod response;
pub mod router;

pub use error::ApiError;
pub use request::*;
pub use response::*;
pub use router::*;
