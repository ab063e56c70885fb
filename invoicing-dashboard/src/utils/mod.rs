pub mod money;
pub mod password;
