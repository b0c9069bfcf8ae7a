mod tb_test;

pub use tb_test::*;
