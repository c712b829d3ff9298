pub mod decoder;
pub mod document;
pub mod encoder;
pub mod grammar;
pub mod validator;
