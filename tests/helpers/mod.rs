// 集成测试共享的测试替身
#![allow(dead_code)]

pub mod mock_store;
