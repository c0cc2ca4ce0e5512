//! Routing `tracing` events into a router
//!
//! [`RouterLayer`] lets libraries that log through `tracing` share the console, files
//! and history of a stacklog router. Events are rendered as
//! `"{target}: {message} {field=value ...}"`.

use std::fmt::{self, Write};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::level::Level;
use crate::logger::RouterAccess;

/// Target prefix of this crate's own diagnostics, never routed back into a router
const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

/// A `tracing_subscriber` layer that logs every event through a router
#[derive(Debug, Clone)]
pub struct RouterLayer<A> {
    access: A,
}

impl<A: RouterAccess> RouterLayer<A> {
    /// Create a layer logging through `access`
    pub fn new(access: A) -> Self {
        Self { access }
    }
}

fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(OWN_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

impl<S, A> Layer<S> for RouterLayer<A>
where
    S: Subscriber,
    A: RouterAccess + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_own_target(metadata.target()) {
            return;
        }

        let level = Level::from(*metadata.level());
        if !self.access.with_router(|router| router.enabled(level)) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let text = visitor.render(metadata.target());
        self.access.with_router(|router| router.log(level, text));
    }
}

/// Collects the message and the remaining fields of an event
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn render(self, target: &str) -> String {
        let mut text = format!("{}: {}", target, self.message);
        text.push_str(&self.fields);
        text
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}
