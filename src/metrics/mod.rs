pub mod host;

pub use host::HostInfo;
