pub mod create;
pub mod init;
pub mod platform;
