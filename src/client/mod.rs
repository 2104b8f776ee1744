//! Story server client: HTTP calls and the thread that streams them.

mod actor;
mod error;
mod http;

pub use actor::{StoryRequest, StreamActor, StreamEnvelope, StreamMessage};
pub use error::{summarize_error_body, ClientError};
pub use http::{ClientResult, StoryClient, StoryStream};
