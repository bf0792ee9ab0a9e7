pub mod create_key;
pub mod run;
