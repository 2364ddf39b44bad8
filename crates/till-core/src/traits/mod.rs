//! Seams between the retry loop and the outside world.

mod timer;
mod transport;

pub use timer::Timer;
pub use transport::{ApiRequest, Method, RawResponse, Transport};
