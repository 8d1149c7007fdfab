/// Outcome of an asynchronous load as seen by the presentation layer.
///
/// Exactly one variant is active at a time. `Failed` may carry the last
/// good value so a screen can keep stale content on display next to the
/// error message; `Ready` always carries a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    Failed { message: String, value: Option<T> },
}

impl<T> Loadable<T> {
    /// A `Failed` with no salvaged value.
    pub fn failed(message: impl Into<String>) -> Self {
        Loadable::Failed {
            message: message.into(),
            value: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    /// The carried value, if any state currently holds one.
    pub fn value(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            Loadable::Failed { value, .. } => value.as_ref(),
            Loadable::Loading => None,
        }
    }
}
