pub mod assembler;
pub mod decoder;
