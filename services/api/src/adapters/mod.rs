pub mod db;
pub mod files;
pub mod notify;

pub use db::DbAdapter;
pub use files::DiskFileAdapter;
pub use notify::LogNotifier;
