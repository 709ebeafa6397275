pub mod error;
pub mod output;
pub mod response;
pub mod status;
pub mod variant;

pub use error::ResponseError;
pub use output::{Framing, HostOutput, RecordedOutput, StreamOutput};
pub use response::Response;
pub use status::Status;
pub use variant::Variant;
