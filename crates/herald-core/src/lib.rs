#![allow(clippy::must_use_candidate)]

mod clock;
mod context;
mod envelope;
mod error;
mod record;

pub use clock::{Clock, FixedClock, SystemClock, format_timestamp};
pub use context::RequestContext;
pub use envelope::{ErrorEnvelope, ResponseEnvelope, message_lines};
pub use error::{FailureBody, HttpError};
pub use record::{DEFAULT_ERROR_MESSAGE, ErrorFormatConfig, ErrorRecord, RESERVED_FIELDS, is_reserved_field};
