pub mod domain;
pub mod http;
pub mod trackme_api;

pub use domain::*;
pub use http::*;
pub use trackme_api::*;
