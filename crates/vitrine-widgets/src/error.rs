/// Why a widget could not attach to the page.
///
/// Each failure affects only the widget instance being created; the page and
/// every other widget keep working.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    /// No element with this id exists in the page.
    #[error("element `{id}` not found")]
    MissingElement { id: String },
    /// Another carousel already owns this container.
    #[error("element `{id}` is already driven by another carousel")]
    AlreadyAttached { id: String },
}
