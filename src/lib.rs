pub mod cli;
pub mod config;
pub mod convert;
pub mod i18n;
pub mod kind;
pub mod ooxml;
pub mod pdf;
pub mod registry;
pub mod request;
pub mod tool;
pub mod util;
pub mod worker;

pub use kind::{ConversionKind, ImageFormat};
pub use registry::Registry;
pub use request::{ConversionOptions, ConversionRequest, ConversionResult};
pub use tool::{Backend, ToolBackend};
