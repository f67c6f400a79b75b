mod api;
pub mod ast;
mod util;

pub use api::{JsParser, Rule};
