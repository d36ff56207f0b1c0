pub mod archive;
pub mod descriptor;
pub mod finder;
pub mod hashing;
pub mod pipeline;
pub mod remote;
pub mod store;
