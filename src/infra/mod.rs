pub mod http_client;
pub mod system_fonts;

pub use http_client::{HttpSettings, ReqwestHttp};
pub use system_fonts::PlatformRegistrar;
