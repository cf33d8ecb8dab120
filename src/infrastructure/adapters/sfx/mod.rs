//! SFX Adapter - 音效生成客户端实现

mod fake_sfx_client;
mod http_sfx_client;

pub use fake_sfx_client::FakeSfxClient;
pub use http_sfx_client::{HttpSfxClient, HttpSfxClientConfig};
