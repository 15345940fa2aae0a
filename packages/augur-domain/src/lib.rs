pub mod context;
pub mod header;
pub mod proxy;
pub mod text;
