//! Outbound side of a debate: where [`DebateEvent`]s go.

use std::future::Future;

use shurahub_types::error::SinkError;
use shurahub_types::event::DebateEvent;

/// Destination for debate frames, in emission order.
///
/// Implementations report [`SinkError::Closed`] once the client is gone and
/// must not attempt further delivery after that.
pub trait EventSink: Send {
    fn emit(&mut self, event: DebateEvent) -> impl Future<Output = Result<(), SinkError>> + Send;
}
