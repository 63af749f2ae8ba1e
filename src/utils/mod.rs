pub mod table;
pub mod errors;
pub mod retry;
pub mod temp;

pub use table::Table;
pub use errors::{AppError, CommandError};
pub use retry::RetryPolicy;
pub use temp::TempArtifact;
