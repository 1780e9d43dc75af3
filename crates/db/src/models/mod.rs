pub mod account;
pub mod email;
pub mod folder;
