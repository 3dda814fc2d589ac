//! Interface to the host framework that renders widgets.

use crate::error::SyncResult;
use formlink_codec::Value;
use formlink_store::{ParamStore, SessionStore};
use std::fmt;

/// The category of widget a host is asked to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Single-line text.
    TextInput,
    /// Multi-line text.
    TextArea,
    /// Numeric input.
    NumberInput,
    /// Checkbox.
    Checkbox,
    /// On/off toggle.
    Toggle,
    /// Drop-down single choice.
    Selectbox,
    /// Radio-button single choice.
    Radio,
    /// Multiple choice.
    Multiselect,
    /// Date picker.
    DateInput,
    /// Time picker.
    TimeInput,
    /// Date and time picker.
    DateTimeInput,
    /// Widget backed by a registered custom codec.
    Custom,
}

/// Stores handed to change handlers when the host dispatches an edit.
pub struct ChangeContext<'a> {
    /// Key of the widget that changed.
    pub key: &'a str,
    /// Query parameters of the page.
    pub params: &'a mut dyn ParamStore,
    /// Session widget values; already holds the new value.
    pub session: &'a mut dyn SessionStore,
}

/// A change handler, run by the host after it stored an edited value.
pub type ChangeCallback = Box<dyn FnMut(&mut ChangeContext<'_>) -> SyncResult<()>>;

/// Everything the host needs to render one widget.
pub struct WidgetRequest {
    /// Widget key, unique within the page.
    pub key: String,
    /// Widget category.
    pub kind: WidgetKind,
    /// Label shown to the user.
    pub label: String,
    /// Value to show when the session holds none for `key`.
    pub initial: Value,
    /// Allowed options, for choice widgets.
    pub options: Vec<Value>,
    /// Host-specific arguments passed through untouched.
    pub props: serde_json::Map<String, serde_json::Value>,
    /// Handler to run after each edit.
    pub on_change: Option<ChangeCallback>,
}

impl fmt::Debug for WidgetRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRequest")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("initial", &self.initial)
            .field("options", &self.options)
            .field("props", &self.props)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

/// Mutable access to both host stores at once.
pub struct HostStores<'a> {
    /// Query parameters.
    pub params: &'a mut dyn ParamStore,
    /// Session widget values.
    pub session: &'a mut dyn SessionStore,
}

/// The framework that owns rendering, session state and the query map.
///
/// A render primitive shows the session value for the widget key if there
/// is one, otherwise seeds the session with `initial`, and returns the value
/// now in effect. When the user edits a widget, the host stores the new
/// value in the session and then runs the widget's `on_change` handler.
pub trait WidgetHost {
    /// Borrows the query parameters and the session store.
    fn stores(&mut self) -> HostStores<'_>;

    /// Renders a widget and returns its live value for this pass.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SyncError::Host`] if the host cannot render.
    fn render(&mut self, request: WidgetRequest) -> SyncResult<Value>;
}
