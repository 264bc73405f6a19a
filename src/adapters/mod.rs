// Adapters layer: concrete snapshot sources (http, local mirror, in-memory).

pub mod http;
pub mod local;
pub mod memory;

pub use http::HttpSource;
pub use local::LocalSource;
pub use memory::MemorySource;
