pub mod db;
pub mod init;
pub mod list;
pub mod log;
pub mod serve;
