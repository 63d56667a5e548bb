pub mod issue;
pub mod payload;
