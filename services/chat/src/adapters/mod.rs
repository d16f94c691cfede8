pub mod responder;
pub mod templates;

pub use responder::{RandomPicker, TokioDelay, UuidResponseIds};
pub use templates::{MiniJinjaRenderer, TemplateCache};
