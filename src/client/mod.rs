pub mod http;

pub use http::BackendClient;
