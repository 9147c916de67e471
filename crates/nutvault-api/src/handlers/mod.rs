pub mod info;
pub mod rate;
pub mod wallet;
