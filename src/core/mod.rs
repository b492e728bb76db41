pub mod editor;
pub mod emitter;
pub mod parser;
pub mod scanner;

pub use crate::domain::model::{Markers, Route, RouteTable};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
