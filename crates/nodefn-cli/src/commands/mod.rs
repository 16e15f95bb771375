pub mod lockfile;
pub mod output;
pub mod plan;
pub mod resolve;
pub mod version;
