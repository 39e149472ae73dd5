//! Library crate for port-probe-rs: concurrent TCP/UDP port probing plus the
//! paging and export helpers used by the binary.
pub mod config;
pub mod error;
pub mod export;
pub mod pager;
pub mod ports;
pub mod probe;
pub mod scanner;
pub mod table;
pub mod types;
pub mod view;

pub use config::ScanConfig;
pub use error::{ScanError, ScanResult};
pub use scanner::Scanner;
pub use types::{PortResult, ScanReport};
