//! Sync engine: initial-value resolution and the write path.

use crate::binding::Binding;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::host::{ChangeCallback, ChangeContext};
use crate::policy::Decision;
use formlink_codec::{CodecError, QueryValue, Value};
use formlink_store::{ParamStore, SessionStore};
use std::fmt;
use tracing::{debug, warn};

/// Where a widget's initial value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialSource {
    /// The session already held a value.
    Session,
    /// Decoded from the query string on the first pass.
    Query,
    /// The configured default.
    Default,
}

/// A query value that could not be decoded and was replaced by the default.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeWarning {
    /// Widget key.
    pub widget_key: String,
    /// Query key.
    pub param_key: String,
    /// The rejected raw value.
    pub raw: QueryValue,
    /// Why it was rejected.
    pub error: CodecError,
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ignored query parameter {:?} for widget {:?}: {}",
            self.param_key, self.widget_key, self.error
        )
    }
}

/// The initial value of a widget for this pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Value to render with.
    pub value: Value,
    /// Its origin.
    pub source: InitialSource,
    /// Set when a query value was rejected.
    pub warning: Option<DecodeWarning>,
}

/// Effect of a write on the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The query string already reflected the value.
    Unchanged,
    /// The key was written.
    Written,
    /// The key was removed.
    Deleted,
}

/// Mediates between widget values and the query string.
///
/// The engine holds only configuration. Stores are passed in on every
/// call, so one engine can serve any number of sessions.
///
/// Per binding and pass the engine:
/// 1. resolves the initial value (query string on the first pass only)
/// 2. lets the host render it
/// 3. writes the live value back, deleting the key for defaults
///
/// Edits dispatched by the host run the write path before the caller's
/// own change handler, so that handler sees an up-to-date query string.
#[derive(Debug, Clone, Default)]
pub struct SyncEngine {
    config: SyncConfig,
}

impl SyncEngine {
    /// Creates an engine.
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Resolves the value a widget starts with on this pass.
    ///
    /// On the first pass of a session for this widget key, a query value
    /// that decodes successfully overrides the default and is stored in
    /// the session. Later passes never look at the query string again, so
    /// the user's edits are not overridden by a URL that has not changed.
    ///
    /// A malformed query value is not an error: the default is used and
    /// the returned resolution carries a [`DecodeWarning`].
    ///
    /// # Errors
    ///
    /// Fails if the query store cannot be read or the session holds a
    /// value of the wrong family.
    pub fn resolve_initial<P, S>(
        &self,
        binding: &Binding,
        params: &P,
        session: &mut S,
    ) -> SyncResult<Resolution>
    where
        P: ParamStore + ?Sized,
        S: SessionStore + ?Sized,
    {
        let key = binding.widget_key();
        let first_pass = !session.is_initialized(key);

        if let Some(value) = session.value(key) {
            binding.check_value(&value)?;
            session.mark_initialized(key);
            return Ok(Resolution {
                value,
                source: InitialSource::Session,
                warning: None,
            });
        }

        let fallback = Resolution {
            value: binding.default_value().clone(),
            source: InitialSource::Default,
            warning: None,
        };
        if !first_pass {
            return Ok(fallback);
        }
        // Marked only once the query was read, so a failed read is retried.
        let query = params.get_query(binding.param_key())?;
        session.mark_initialized(key);
        let Some(raw) = query else {
            return Ok(fallback);
        };

        match binding.codec().decode(&raw) {
            Ok(value) => {
                debug!(widget = key, param = binding.param_key(), "initial value from query string");
                session.set_value(key, value.clone());
                Ok(Resolution {
                    value,
                    source: InitialSource::Query,
                    warning: None,
                })
            }
            Err(error) => {
                if self.config.warn_on_decode_failure {
                    warn!(
                        widget = key,
                        param = binding.param_key(),
                        %error,
                        "malformed query parameter, using default"
                    );
                }
                Ok(Resolution {
                    warning: Some(DecodeWarning {
                        widget_key: key.to_string(),
                        param_key: binding.param_key().to_string(),
                        raw,
                        error,
                    }),
                    ..fallback
                })
            }
        }
    }

    /// Returns true if the query string already represents `value`.
    ///
    /// A default value is reflected by an absent key; anything else by an
    /// entry that decodes to exactly `value`.
    pub fn is_reflected<P>(&self, binding: &Binding, value: &Value, params: &P) -> SyncResult<bool>
    where
        P: ParamStore + ?Sized,
    {
        let current = params.get_query(binding.param_key())?;
        Ok(match self.decide(binding, value) {
            Decision::Omit => current.is_none(),
            Decision::Keep => current
                .and_then(|raw| binding.codec().decode(&raw).ok())
                .is_some_and(|decoded| decoded == *value),
        })
    }

    /// Writes `value` to the binding's query key.
    ///
    /// Default values delete the key; others are encoded and stored unless
    /// the query string already reflects them. Excluded keys are never
    /// touched. Keys of other bindings are never touched.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Encode`] if the codec cannot encode `value`,
    /// which indicates a programming error rather than bad input.
    pub fn write<P>(&self, binding: &Binding, value: &Value, params: &mut P) -> SyncResult<WriteOutcome>
    where
        P: ParamStore + ?Sized,
    {
        let param_key = binding.param_key();
        if self.config.is_excluded(param_key) {
            return Ok(WriteOutcome::Unchanged);
        }
        if self.is_reflected(binding, value, &*params)? {
            return Ok(WriteOutcome::Unchanged);
        }

        match self.decide(binding, value) {
            Decision::Omit => {
                params.delete(param_key)?;
                debug!(param = param_key, "removed default value from query string");
                Ok(WriteOutcome::Deleted)
            }
            Decision::Keep => {
                let encoded = binding
                    .codec()
                    .encode(value)
                    .map_err(|source| SyncError::Encode {
                        key: binding.widget_key().to_string(),
                        source,
                    })?;
                params.put_query(param_key, encoded)?;
                debug!(param = param_key, "wrote value to query string");
                Ok(WriteOutcome::Written)
            }
        }
    }

    /// Writes `value` unless it would delete the key.
    pub fn add<P>(&self, binding: &Binding, value: &Value, params: &mut P) -> SyncResult<WriteOutcome>
    where
        P: ParamStore + ?Sized,
    {
        match self.decide(binding, value) {
            Decision::Omit => Ok(WriteOutcome::Unchanged),
            Decision::Keep => self.write(binding, value, params),
        }
    }

    /// Runs the write path after a render, for bindings with autoupdate.
    pub fn sync_live<P>(&self, binding: &Binding, live: &Value, params: &mut P) -> SyncResult<WriteOutcome>
    where
        P: ParamStore + ?Sized,
    {
        if !binding.autoupdate() {
            return Ok(WriteOutcome::Unchanged);
        }
        binding.check_value(live)?;
        self.write(binding, live, params)
    }

    /// Wraps the caller's change handler with the write path.
    ///
    /// The returned handler writes the session's new value to the query
    /// string and then calls `user` with the same context. Bindings without
    /// autoupdate get `user` back unchanged.
    pub fn chain_on_change(
        &self,
        binding: &Binding,
        user: Option<ChangeCallback>,
    ) -> Option<ChangeCallback> {
        if !binding.autoupdate() {
            return user;
        }
        let engine = self.clone();
        let binding = binding.clone();
        let mut user = user;
        Some(Box::new(move |ctx: &mut ChangeContext<'_>| {
            let value = ctx
                .session
                .value(binding.widget_key())
                .unwrap_or_else(|| binding.default_value().clone());
            engine.sync_live(&binding, &value, &mut *ctx.params)?;
            if let Some(user) = user.as_mut() {
                user(ctx)?;
            }
            Ok(())
        }))
    }

    /// Resolves a widget that shares its query key with `owner`.
    ///
    /// The widget starts from the owner's session value, which already
    /// reflects the query string, and its own session entry is overwritten
    /// with it so both widgets show the same state.
    pub fn resolve_mirror<S>(&self, owner: &Binding, mirror: &Binding, session: &mut S) -> Resolution
    where
        S: SessionStore + ?Sized,
    {
        let value = session
            .value(owner.widget_key())
            .unwrap_or_else(|| owner.default_value().clone());
        session.set_value(mirror.widget_key(), value.clone());
        session.mark_initialized(mirror.widget_key());
        Resolution {
            value,
            source: InitialSource::Session,
            warning: None,
        }
    }

    /// Wraps the change handler of a widget that mirrors `owner`.
    ///
    /// An edit is copied into the owner's session entry and written through
    /// the owner's binding, so the next pass renders both widgets with it.
    pub fn chain_mirror(
        &self,
        owner: &Binding,
        mirror: &Binding,
        user: Option<ChangeCallback>,
    ) -> Option<ChangeCallback> {
        if !mirror.autoupdate() {
            return user;
        }
        let engine = self.clone();
        let owner = owner.clone();
        let mirror_key = mirror.widget_key().to_string();
        let mut user = user;
        Some(Box::new(move |ctx: &mut ChangeContext<'_>| {
            let value = ctx
                .session
                .value(&mirror_key)
                .unwrap_or_else(|| owner.default_value().clone());
            ctx.session.set_value(owner.widget_key(), value.clone());
            engine.sync_live(&owner, &value, &mut *ctx.params)?;
            if let Some(user) = user.as_mut() {
                user(ctx)?;
            }
            Ok(())
        }))
    }

    fn decide(&self, binding: &Binding, value: &Value) -> Decision {
        self.config
            .default_policy
            .decide(binding.codec(), value, binding.default_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;
    use crate::policy::DefaultPolicy;
    use formlink_codec::{Codec, InvalidElements};
    use formlink_store::{InMemoryParamStore, InMemorySession, StoreError};

    fn checkbox(key: &str) -> Binding {
        Binding::new(key, Codec::Bool, Some(Value::Bool(false))).unwrap()
    }

    fn tags() -> Binding {
        let codec = Codec::multi_choice(
            vec!["a".into(), "b".into(), "c".into()],
            InvalidElements::Discard,
        )
        .unwrap();
        Binding::new("tags", codec, Some(Value::List(vec![]))).unwrap()
    }

    #[test]
    fn first_pass_reads_query() {
        let engine = SyncEngine::default();
        let params = InMemoryParamStore::from_query_string("subscribe=true");
        let mut session = InMemorySession::new();

        let resolution = engine
            .resolve_initial(&checkbox("subscribe"), &params, &mut session)
            .unwrap();
        assert_eq!(resolution.value, Value::Bool(true));
        assert_eq!(resolution.source, InitialSource::Query);
        assert_eq!(session.value("subscribe"), Some(Value::Bool(true)));
        assert!(session.is_initialized("subscribe"));
    }

    #[test]
    fn later_passes_ignore_query() {
        let engine = SyncEngine::default();
        let binding = checkbox("subscribe");
        let params = InMemoryParamStore::from_query_string("subscribe=true");
        let mut session = InMemorySession::new();
        engine.resolve_initial(&binding, &params, &mut session).unwrap();

        // The user unticks the box; the URL has not caught up yet.
        session.set_value("subscribe", Value::Bool(false));
        let resolution = engine.resolve_initial(&binding, &params, &mut session).unwrap();
        assert_eq!(resolution.value, Value::Bool(false));
        assert_eq!(resolution.source, InitialSource::Session);

        // Even with the session value cleared, the URL is not read again.
        session.remove("subscribe");
        let resolution = engine.resolve_initial(&binding, &params, &mut session).unwrap();
        assert_eq!(resolution.value, Value::Bool(false));
        assert_eq!(resolution.source, InitialSource::Default);
    }

    #[test]
    fn existing_session_value_wins_over_query() {
        let engine = SyncEngine::default();
        let params = InMemoryParamStore::from_query_string("subscribe=true");
        let mut session = InMemorySession::with_values([("subscribe", Value::Bool(false))]);
        let resolution = engine
            .resolve_initial(&checkbox("subscribe"), &params, &mut session)
            .unwrap();
        assert_eq!(resolution.value, Value::Bool(false));
        assert_eq!(resolution.source, InitialSource::Session);
    }

    #[test]
    fn malformed_query_falls_back_with_warning() {
        let engine = SyncEngine::default();
        let params = InMemoryParamStore::from_query_string("subscribe=");
        let mut session = InMemorySession::new();
        let resolution = engine
            .resolve_initial(&checkbox("subscribe"), &params, &mut session)
            .unwrap();
        assert_eq!(resolution.value, Value::Bool(false));
        assert_eq!(resolution.source, InitialSource::Default);
        let warning = resolution.warning.unwrap();
        assert_eq!(warning.raw, QueryValue::from(""));
        assert!(warning.error.is_decode_side());
        assert!(!session.contains("subscribe"));
    }

    #[test]
    fn wrong_session_family_is_configuration_error() {
        let engine = SyncEngine::default();
        let params = InMemoryParamStore::new();
        let mut session = InMemorySession::with_values([("subscribe", Value::from("yes"))]);
        let err = engine
            .resolve_initial(&checkbox("subscribe"), &params, &mut session)
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::Configuration(ConfigurationError::WrongValueType { .. })
        ));
    }

    #[test]
    fn write_and_delete() {
        let engine = SyncEngine::default();
        let binding = checkbox("subscribe");
        let mut params = InMemoryParamStore::new();

        let outcome = engine.write(&binding, &Value::Bool(true), &mut params).unwrap();
        assert_eq!(outcome, WriteOutcome::Written);
        assert_eq!(params.to_query_string(), "subscribe=true");

        let outcome = engine.write(&binding, &Value::Bool(false), &mut params).unwrap();
        assert_eq!(outcome, WriteOutcome::Deleted);
        assert_eq!(params.to_query_string(), "");

        let outcome = engine.write(&binding, &Value::Bool(false), &mut params).unwrap();
        assert_eq!(outcome, WriteOutcome::Unchanged);
    }

    #[test]
    fn write_is_idempotent() {
        let engine = SyncEngine::default();
        let binding = tags();
        let mut params = InMemoryParamStore::from_query_string("other=1");
        let value = Value::from(vec!["c", "a"]);

        engine.write(&binding, &value, &mut params).unwrap();
        let once = params.snapshot();
        let outcome = engine.write(&binding, &value, &mut params).unwrap();
        assert_eq!(outcome, WriteOutcome::Unchanged);
        assert_eq!(params.snapshot(), once);
        assert_eq!(params.to_query_string(), "other=1&tags=c&tags=a");
    }

    #[test]
    fn reflected_value_keeps_user_spelling() {
        let engine = SyncEngine::default();
        let mut params = InMemoryParamStore::from_query_string("subscribe=TRUE");
        let outcome = engine
            .write(&checkbox("subscribe"), &Value::Bool(true), &mut params)
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Unchanged);
        assert_eq!(params.to_query_string(), "subscribe=TRUE");
    }

    #[test]
    fn reordered_selection_is_rewritten() {
        let engine = SyncEngine::default();
        let mut params = InMemoryParamStore::from_query_string("tags=a&tags=c");
        let outcome = engine
            .write(&tags(), &Value::from(vec!["c", "a"]), &mut params)
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Written);
        assert_eq!(params.get_all("tags").unwrap(), vec!["c", "a"]);
    }

    #[test]
    fn keep_all_writes_defaults() {
        let engine = SyncEngine::new(SyncConfig::new().with_default_policy(DefaultPolicy::KeepAll));
        let mut params = InMemoryParamStore::new();
        engine
            .write(&checkbox("subscribe"), &Value::Bool(false), &mut params)
            .unwrap();
        assert_eq!(params.to_query_string(), "subscribe=false");
    }

    #[test]
    fn excluded_keys_are_never_written() {
        let engine = SyncEngine::new(SyncConfig::new().exclude_key("subscribe"));
        let mut params = InMemoryParamStore::from_query_string("subscribe=false");
        let outcome = engine
            .write(&checkbox("subscribe"), &Value::Bool(true), &mut params)
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Unchanged);
        assert_eq!(params.to_query_string(), "subscribe=false");
    }

    #[test]
    fn add_never_deletes() {
        let engine = SyncEngine::default();
        let mut params = InMemoryParamStore::from_query_string("subscribe=true");
        let outcome = engine
            .add(&checkbox("subscribe"), &Value::Bool(false), &mut params)
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Unchanged);
        assert!(params.contains("subscribe").unwrap());
    }

    #[test]
    fn encode_failure_is_raised() {
        let engine = SyncEngine::default();
        let binding = Binding::new("ratio", Codec::Float, Some(Value::Float(1.0))).unwrap();
        let mut params = InMemoryParamStore::new();
        let err = engine
            .write(&binding, &Value::Float(f64::INFINITY), &mut params)
            .unwrap_err();
        assert!(matches!(err, SyncError::Encode { .. }));
    }

    #[test]
    fn store_failure_propagates() {
        let engine = SyncEngine::default();
        let mut params = InMemoryParamStore::new();
        params.set_read_only(true);
        let err = engine
            .write(&checkbox("subscribe"), &Value::Bool(true), &mut params)
            .unwrap_err();
        assert!(matches!(err, SyncError::Store(StoreError::ReadOnly { .. })));
    }

    #[test]
    fn chained_handler_writes_before_user_callback() {
        let engine = SyncEngine::default();
        let binding = checkbox("subscribe");
        let seen = std::rc::Rc::new(std::cell::RefCell::new(None));
        let seen_in_callback = std::rc::Rc::clone(&seen);
        let user: ChangeCallback = Box::new(move |ctx: &mut ChangeContext<'_>| {
            *seen_in_callback.borrow_mut() = ctx.params.get("subscribe")?;
            Ok(())
        });

        let mut handler = engine.chain_on_change(&binding, Some(user)).unwrap();
        let mut params = InMemoryParamStore::new();
        let mut session = InMemorySession::new();
        session.set_value("subscribe", Value::Bool(true));
        let mut ctx = ChangeContext {
            key: "subscribe",
            params: &mut params,
            session: &mut session,
        };
        handler(&mut ctx).unwrap();

        assert_eq!(seen.borrow().as_deref(), Some("true"));
        assert_eq!(params.to_query_string(), "subscribe=true");
    }

    #[test]
    fn no_autoupdate_keeps_user_handler_only() {
        let engine = SyncEngine::default();
        let binding = checkbox("subscribe").with_autoupdate(false);
        assert!(engine.chain_on_change(&binding, None).is_none());

        let mut params = InMemoryParamStore::new();
        let outcome = engine
            .sync_live(&binding, &Value::Bool(true), &mut params)
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Unchanged);
        assert!(params.keys().unwrap().is_empty());
    }

    /// Delegates to an in-memory store until switched off.
    struct FlakyParams {
        inner: InMemoryParamStore,
        down: bool,
    }

    impl FlakyParams {
        fn check(&self) -> formlink_store::StoreResult<()> {
            if self.down {
                Err(StoreError::Unavailable("host offline".into()))
            } else {
                Ok(())
            }
        }
    }

    impl ParamStore for FlakyParams {
        fn get(&self, key: &str) -> formlink_store::StoreResult<Option<String>> {
            self.check()?;
            self.inner.get(key)
        }
        fn get_all(&self, key: &str) -> formlink_store::StoreResult<Vec<String>> {
            self.check()?;
            self.inner.get_all(key)
        }
        fn set(&mut self, key: &str, value: String) -> formlink_store::StoreResult<()> {
            self.check()?;
            self.inner.set(key, value)
        }
        fn set_all(&mut self, key: &str, values: Vec<String>) -> formlink_store::StoreResult<()> {
            self.check()?;
            self.inner.set_all(key, values)
        }
        fn delete(&mut self, key: &str) -> formlink_store::StoreResult<bool> {
            self.check()?;
            self.inner.delete(key)
        }
        fn keys(&self) -> formlink_store::StoreResult<Vec<String>> {
            self.check()?;
            self.inner.keys()
        }
    }

    #[test]
    fn failed_query_read_is_retried_next_pass() {
        let engine = SyncEngine::default();
        let binding = checkbox("subscribe");
        let mut params = FlakyParams {
            inner: InMemoryParamStore::from_query_string("subscribe=true"),
            down: true,
        };
        let mut session = InMemorySession::new();

        let err = engine
            .resolve_initial(&binding, &params, &mut session)
            .unwrap_err();
        assert!(matches!(err, SyncError::Store(StoreError::Unavailable(_))));
        assert!(!session.is_initialized("subscribe"));

        params.down = false;
        let resolution = engine
            .resolve_initial(&binding, &params, &mut session)
            .unwrap();
        assert_eq!(resolution.source, InitialSource::Query);
        assert_eq!(resolution.value, Value::Bool(true));
        assert!(session.is_initialized("subscribe"));
    }

    #[test]
    fn wrong_session_family_leaves_key_unmarked() {
        let engine = SyncEngine::default();
        let params = InMemoryParamStore::new();
        let mut session = InMemorySession::new();
        session.set_value("subscribe", Value::from("yes"));
        assert!(engine
            .resolve_initial(&checkbox("subscribe"), &params, &mut session)
            .is_err());
        assert!(!session.is_initialized("subscribe"));
    }

    #[test]
    fn mirror_follows_owner_session_value() {
        let engine = SyncEngine::default();
        let owner = Binding::new("a", Codec::Integer, Some(Value::Integer(0)))
            .unwrap()
            .with_param_key("n");
        let mirror = Binding::new("b", Codec::Integer, Some(Value::Integer(0)))
            .unwrap()
            .with_param_key("n");
        let mut session = InMemorySession::new();
        session.set_value("a", Value::Integer(4));
        session.set_value("b", Value::Integer(9));

        let resolution = engine.resolve_mirror(&owner, &mirror, &mut session);
        assert_eq!(resolution.value, Value::Integer(4));
        assert_eq!(session.value("b"), Some(Value::Integer(4)));
        assert!(session.is_initialized("b"));
    }

    #[test]
    fn mirror_edit_is_written_through_owner() {
        let engine = SyncEngine::default();
        let owner = Binding::new("a", Codec::Integer, Some(Value::Integer(0)))
            .unwrap()
            .with_param_key("n");
        let mirror = Binding::new("b", Codec::Integer, Some(Value::Integer(0)))
            .unwrap()
            .with_param_key("n");
        let mut handler = engine.chain_mirror(&owner, &mirror, None).unwrap();
        let mut params = InMemoryParamStore::new();
        let mut session = InMemorySession::new();
        session.set_value("b", Value::Integer(2));
        let mut ctx = ChangeContext {
            key: "b",
            params: &mut params,
            session: &mut session,
        };
        handler(&mut ctx).unwrap();

        assert_eq!(session.value("a"), Some(Value::Integer(2)));
        assert_eq!(params.to_query_string(), "n=2");
    }
}
