//! A scripted widget host for driving forms in tests.
//!
//! [`FakeHost`] behaves like a reactive web framework: it renders the
//! session value of a widget if there is one, keeps the change handler of
//! every rendered widget, and dispatches edits to it.

use formlink_codec::Value;
use formlink_store::{InMemoryParamStore, InMemorySession, ParamStore, SessionStore};
use formlink_sync::{
    ChangeCallback, ChangeContext, Form, HostStores, SyncEngine, SyncResult, WidgetHost,
    WidgetKind, WidgetRequest,
};
use std::collections::BTreeMap;

/// What the host remembers about a widget from the last pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedWidget {
    /// Widget category.
    pub kind: WidgetKind,
    /// Label.
    pub label: String,
    /// Initial value passed by the form.
    pub initial: Value,
    /// Value returned to the form.
    pub value: Value,
    /// Choice options.
    pub options: Vec<Value>,
    /// Pass-through arguments.
    pub props: serde_json::Map<String, serde_json::Value>,
}

/// An in-memory host with one query string and one session.
#[derive(Default)]
pub struct FakeHost {
    params: InMemoryParamStore,
    session: InMemorySession,
    widgets: BTreeMap<String, RenderedWidget>,
    handlers: BTreeMap<String, ChangeCallback>,
    renders: usize,
}

impl FakeHost {
    /// Creates a host with an empty query string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a host whose page was opened with `query`.
    pub fn with_query(query: &str) -> Self {
        Self {
            params: InMemoryParamStore::from_query_string(query),
            ..Self::default()
        }
    }

    /// Follows a link to `query` within the same session.
    pub fn navigate(&mut self, query: &str) {
        self.params = InMemoryParamStore::from_query_string(query);
    }

    /// Starts a new session on the current URL, as a fresh visit would.
    pub fn new_session(&mut self) {
        self.session = InMemorySession::new();
        self.widgets.clear();
        self.handlers.clear();
    }

    /// Runs one render pass.
    pub fn pass<R>(
        &mut self,
        engine: &SyncEngine,
        body: impl FnOnce(&mut Form<'_, Self>) -> SyncResult<R>,
    ) -> SyncResult<R> {
        self.widgets.clear();
        self.handlers.clear();
        let mut form = Form::new(self, engine.clone());
        body(&mut form)
    }

    /// Simulates the user editing widget `key`.
    ///
    /// The new value goes into the session first, then the widget's change
    /// handler runs, as a reactive framework would do it.
    pub fn edit(&mut self, key: &str, value: impl Into<Value>) -> SyncResult<()> {
        self.session.set_value(key, value.into());
        let Some(handler) = self.handlers.get_mut(key) else {
            return Ok(());
        };
        let mut ctx = ChangeContext {
            key,
            params: &mut self.params,
            session: &mut self.session,
        };
        handler(&mut ctx)
    }

    /// Runs an arbitrary handler against the host's stores.
    pub fn invoke(&mut self, key: &str, handler: &mut ChangeCallback) -> SyncResult<()> {
        let mut ctx = ChangeContext {
            key,
            params: &mut self.params,
            session: &mut self.session,
        };
        handler(&mut ctx)
    }

    /// The widget rendered under `key` in the last pass.
    pub fn widget(&self, key: &str) -> Option<&RenderedWidget> {
        self.widgets.get(key)
    }

    /// Returns true if `key` was rendered with a change handler.
    pub fn has_handler(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Number of widgets rendered since the host was created.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// The query parameters.
    pub fn params(&self) -> &InMemoryParamStore {
        &self.params
    }

    /// Mutable query parameters, for tests that fiddle with the URL.
    pub fn params_mut(&mut self) -> &mut InMemoryParamStore {
        &mut self.params
    }

    /// The session.
    pub fn session(&self) -> &InMemorySession {
        &self.session
    }

    /// The current query string without a leading `?`.
    pub fn query_string(&self) -> String {
        self.params.to_query_string()
    }

    /// Returns true if the query string has `key`.
    pub fn has_param(&self, key: &str) -> bool {
        self.params.contains(key).unwrap_or(false)
    }
}

impl WidgetHost for FakeHost {
    fn stores(&mut self) -> HostStores<'_> {
        HostStores {
            params: &mut self.params,
            session: &mut self.session,
        }
    }

    fn render(&mut self, request: WidgetRequest) -> SyncResult<Value> {
        let value = match self.session.value(&request.key) {
            Some(value) => value,
            None => {
                self.session.set_value(&request.key, request.initial.clone());
                request.initial.clone()
            }
        };
        if let Some(handler) = request.on_change {
            self.handlers.insert(request.key.clone(), handler);
        }
        self.widgets.insert(
            request.key,
            RenderedWidget {
                kind: request.kind,
                label: request.label,
                initial: request.initial,
                value: value.clone(),
                options: request.options,
                props: request.props,
            },
        );
        self.renders += 1;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_seeds_session_once() {
        let mut host = FakeHost::with_query("name=x");
        let engine = SyncEngine::default();
        let name = host
            .pass(&engine, |form| form.text_input("name", "").show())
            .unwrap();
        assert_eq!(name, "x");
        assert_eq!(host.session().value("name"), Some(Value::from("x")));
        assert_eq!(host.widget("name").unwrap().kind, WidgetKind::TextInput);
        assert!(host.has_handler("name"));
        assert_eq!(host.render_count(), 1);
    }

    #[test]
    fn edit_without_handler_only_updates_session() {
        let mut host = FakeHost::new();
        host.edit("ghost", true).unwrap();
        assert_eq!(host.session().value("ghost"), Some(Value::Bool(true)));
        assert_eq!(host.query_string(), "");
    }
}
