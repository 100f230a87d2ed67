pub mod decode;
pub mod info;
