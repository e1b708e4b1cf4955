pub mod genre;
mod macros;
pub mod movie;
