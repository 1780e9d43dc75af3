pub mod folders;
pub mod messages;
pub mod session;
