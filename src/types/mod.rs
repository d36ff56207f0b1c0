pub mod errors;
pub mod record;

pub use errors::{CoreError, CoreResult};
pub use record::{ModRecord, PermissionPolicy};
