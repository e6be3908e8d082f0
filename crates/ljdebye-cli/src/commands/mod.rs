pub mod compute;
pub mod table;
