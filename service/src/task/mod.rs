//! Background [`Task`]s definitions.

mod background;
pub mod expire_reset_tokens;

pub use common::Handler as Task;

pub use self::{
    background::Background, expire_reset_tokens::ExpireResetTokens,
};
