//! Generation backends and the dispatcher that selects among them.

pub mod dispatcher;
pub(crate) mod http;
pub mod mock;
pub mod openai;
pub mod tgi;
pub mod vllm;

pub use dispatcher::BackendDispatcher;
pub use mock::MockBackend;
pub use openai::OpenAiBackend;
pub use tgi::TgiBackend;
pub use vllm::VllmBackend;
