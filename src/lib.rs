#![forbid(unsafe_code)]

mod context;
mod decode;
mod encode;
mod engine;
mod error;
mod frame;
mod packet;

pub use context::{SplashContext, SplashParams};
pub use encode::EncodedPacket;
pub use error::{SplashError, SplashResult};
pub use frame::FrameRgbx;
pub use packet::{ERROR_LIMIT, HEADER_LENGTH, MAGIC, VERSION};
