pub mod extract;
pub mod generate;
pub mod pages;
pub mod render;
