//! Failure annotation attached to an event when a `Map`-stage component
//! raises (§7 "Component errors are attached to the event, annotated with
//! plugin name and component name, and surfaced to the next Tap").

/// Records that some component failed while processing this event. Kept
/// separate from `jana_factory::FactoryError`/`jana_arrow::ArrowError` so
/// that `jana-event` doesn't need to depend on either — this is just the
/// annotation a `MapArrow` leaves behind for the next `TapArrow` to see.
#[derive(Debug, Clone)]
pub struct EventFailure {
    pub component: String,
    pub plugin: Option<String>,
    pub message: String,
}

impl EventFailure {
    pub fn new(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            plugin: None,
            message: message.into(),
        }
    }

    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = Some(plugin.into());
        self
    }
}
