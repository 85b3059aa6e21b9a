mod money;

pub mod helpers;
pub mod op;
mod secret;

pub use money::{Paise, PaiseConversionError};
pub use secret::Secret;
