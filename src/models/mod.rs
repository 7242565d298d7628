pub mod email;

pub use email::{GenerateResponse, SendResponse};
