pub mod domain;
pub mod markup;
