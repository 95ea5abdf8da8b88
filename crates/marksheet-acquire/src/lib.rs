pub mod captcha;
pub mod config;
pub mod error;
pub mod output;
pub mod portal;
pub mod session;
pub mod submit;

pub use captcha::CaptchaImage;
pub use config::PortalConfig;
pub use error::PortalError;
pub use portal::PortalSession;
pub use session::{SessionRegistry, VisitorSessionSet};
