pub mod json;
pub mod pagination;

pub use json::ApiJson;
pub use pagination::PaginationParams;
