//! Query-synced widget constructors.

use crate::binding::{Binding, BindingSet};
use crate::engine::{DecodeWarning, SyncEngine};
use crate::error::{ConfigurationError, SyncResult};
use crate::host::{ChangeCallback, ChangeContext, HostStores, WidgetHost, WidgetKind, WidgetRequest};
use crate::native::NativeValue;
use formlink_codec::{
    Codec, CodecRegistry, InvalidElements, NaiveDate, NaiveDateTime, NaiveTime, Value,
};
use std::marker::PhantomData;

/// One render pass of a query-synced form.
///
/// Every widget constructor returns a [`Widget`] builder; calling
/// [`Widget::show`] binds the widget to its query key, resolves its
/// initial value, renders it through the host and writes the live value
/// back.
///
/// # Example
///
/// ```rust,ignore
/// let mut form = Form::new(&mut host, SyncEngine::default());
/// let name: String = form.text_input("name", "").label("Name").show()?;
/// let subscribe: bool = form.checkbox("subscribe", false).show()?;
/// ```
pub struct Form<'h, H: WidgetHost + ?Sized> {
    pub(crate) host: &'h mut H,
    pub(crate) engine: SyncEngine,
    pub(crate) registry: CodecRegistry,
    pub(crate) bindings: BindingSet,
    warnings: Vec<DecodeWarning>,
}

impl<'h, H: WidgetHost + ?Sized> Form<'h, H> {
    /// Starts a render pass.
    pub fn new(host: &'h mut H, engine: SyncEngine) -> Self {
        Self {
            host,
            engine,
            registry: CodecRegistry::new(),
            bindings: BindingSet::new(),
            warnings: Vec::new(),
        }
    }

    /// Uses `registry` to look up codecs for [`Form::custom`] widgets.
    pub fn with_registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The engine.
    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    /// Query values rejected so far in this pass.
    pub fn warnings(&self) -> &[DecodeWarning] {
        &self.warnings
    }

    /// Widgets bound so far in this pass.
    pub fn bindings(&self) -> &BindingSet {
        &self.bindings
    }

    /// Binds and renders one widget, returning its live value.
    ///
    /// This is the untyped path behind every [`Widget`]; it is public for
    /// hosts with widget categories of their own.
    ///
    /// The first widget bound to a query key owns it. Later widgets on the
    /// same key show the owner's value and route their edits through the
    /// owner, so the key never holds two competing values.
    ///
    /// # Errors
    ///
    /// Configuration errors are raised before anything is rendered. Store,
    /// host and encode failures are propagated.
    pub fn field(
        &mut self,
        binding: Binding,
        kind: WidgetKind,
        label: String,
        props: serde_json::Map<String, serde_json::Value>,
        on_change: Option<ChangeCallback>,
    ) -> SyncResult<Value> {
        self.bindings.check(&binding)?;
        // A later widget on a bound query key mirrors the first one.
        let owner = self.bindings.owner(binding.param_key()).cloned();

        let resolution = {
            let HostStores { params, session } = self.host.stores();
            match &owner {
                Some(owner) => self.engine.resolve_mirror(owner, &binding, session),
                None => self.engine.resolve_initial(&binding, &*params, session)?,
            }
        };
        if let Some(warning) = resolution.warning {
            self.warnings.push(warning);
        }

        let options = binding
            .codec()
            .choices()
            .map(|choices| choices.options().to_vec())
            .unwrap_or_default();
        let request = WidgetRequest {
            key: binding.widget_key().to_string(),
            kind,
            label,
            initial: resolution.value,
            options,
            props,
            on_change: match &owner {
                Some(owner) => self.engine.chain_mirror(owner, &binding, on_change),
                None => self.engine.chain_on_change(&binding, on_change),
            },
        };
        let live = self.host.render(request)?;
        binding.check_value(&live)?;

        if owner.is_none() {
            let HostStores { params, .. } = self.host.stores();
            self.engine.sync_live(&binding, &live, params)?;
        }
        self.bindings.insert(binding)?;
        Ok(live)
    }

    /// A single-line text widget.
    pub fn text_input(&mut self, key: &str, default: impl Into<String>) -> Widget<'_, 'h, H, String> {
        Widget::new(self, key, WidgetKind::TextInput, CodecSpec::Fixed(Codec::Text))
            .default(default.into())
    }

    /// A multi-line text widget.
    pub fn text_area(&mut self, key: &str, default: impl Into<String>) -> Widget<'_, 'h, H, String> {
        Widget::new(self, key, WidgetKind::TextArea, CodecSpec::Fixed(Codec::Text))
            .default(default.into())
    }

    /// An integer widget.
    pub fn number_input(&mut self, key: &str, default: i64) -> Widget<'_, 'h, H, i64> {
        Widget::new(self, key, WidgetKind::NumberInput, CodecSpec::Fixed(Codec::Integer))
            .default(default)
    }

    /// A floating-point number widget.
    pub fn float_input(&mut self, key: &str, default: f64) -> Widget<'_, 'h, H, f64> {
        Widget::new(self, key, WidgetKind::NumberInput, CodecSpec::Fixed(Codec::Float))
            .default(default)
    }

    /// A checkbox.
    pub fn checkbox(&mut self, key: &str, default: bool) -> Widget<'_, 'h, H, bool> {
        Widget::new(self, key, WidgetKind::Checkbox, CodecSpec::Fixed(Codec::Bool))
            .default(default)
    }

    /// An on/off toggle.
    pub fn toggle(&mut self, key: &str, default: bool) -> Widget<'_, 'h, H, bool> {
        Widget::new(self, key, WidgetKind::Toggle, CodecSpec::Fixed(Codec::Bool)).default(default)
    }

    /// A drop-down choosing one of `options`.
    pub fn selectbox<T: NativeValue>(
        &mut self,
        key: &str,
        options: Vec<T>,
        default: T,
    ) -> Widget<'_, 'h, H, T> {
        let options = options.into_iter().map(NativeValue::into_value).collect();
        Widget::new(self, key, WidgetKind::Selectbox, CodecSpec::Choice(options)).default(default)
    }

    /// Radio buttons choosing one of `options`.
    pub fn radio<T: NativeValue>(
        &mut self,
        key: &str,
        options: Vec<T>,
        default: T,
    ) -> Widget<'_, 'h, H, T> {
        let options = options.into_iter().map(NativeValue::into_value).collect();
        Widget::new(self, key, WidgetKind::Radio, CodecSpec::Choice(options)).default(default)
    }

    /// A widget choosing any number of `options`, in selection order.
    pub fn multiselect<T: NativeValue>(
        &mut self,
        key: &str,
        options: Vec<T>,
        default: Vec<T>,
    ) -> Widget<'_, 'h, H, Vec<T>> {
        let options = options.into_iter().map(NativeValue::into_value).collect();
        Widget::new(self, key, WidgetKind::Multiselect, CodecSpec::Multi(options)).default(default)
    }

    /// A date picker.
    pub fn date_input(&mut self, key: &str, default: NaiveDate) -> Widget<'_, 'h, H, NaiveDate> {
        Widget::new(self, key, WidgetKind::DateInput, CodecSpec::Fixed(Codec::Date))
            .default(default)
    }

    /// A time picker.
    pub fn time_input(&mut self, key: &str, default: NaiveTime) -> Widget<'_, 'h, H, NaiveTime> {
        Widget::new(self, key, WidgetKind::TimeInput, CodecSpec::Fixed(Codec::Time))
            .default(default)
    }

    /// A date and time picker.
    pub fn datetime_input(
        &mut self,
        key: &str,
        default: NaiveDateTime,
    ) -> Widget<'_, 'h, H, NaiveDateTime> {
        Widget::new(
            self,
            key,
            WidgetKind::DateTimeInput,
            CodecSpec::Fixed(Codec::DateTime),
        )
        .default(default)
    }

    /// A widget using the codec registered under `tag`.
    ///
    /// No default is implied; call [`Widget::default`] before showing it.
    pub fn custom<T: NativeValue>(&mut self, key: &str, tag: &str) -> Widget<'_, 'h, H, T> {
        Widget::new(self, key, WidgetKind::Custom, CodecSpec::Registered(tag.to_string()))
    }
}

enum CodecSpec {
    Fixed(Codec),
    Choice(Vec<Value>),
    Multi(Vec<Value>),
    Registered(String),
}

/// Builder for one query-synced widget, typed by its native value.
#[must_use = "a widget is only rendered by `show`"]
pub struct Widget<'f, 'h, H: WidgetHost + ?Sized, T> {
    form: &'f mut Form<'h, H>,
    key: String,
    kind: WidgetKind,
    spec: CodecSpec,
    default: Option<Value>,
    param_key: Option<String>,
    label: Option<String>,
    props: serde_json::Map<String, serde_json::Value>,
    on_change: Option<ChangeCallback>,
    autoupdate: Option<bool>,
    invalid: Option<InvalidElements>,
    _native: PhantomData<fn() -> T>,
}

impl<'f, 'h, H: WidgetHost + ?Sized, T: NativeValue> Widget<'f, 'h, H, T> {
    fn new(form: &'f mut Form<'h, H>, key: &str, kind: WidgetKind, spec: CodecSpec) -> Self {
        Self {
            form,
            key: key.to_string(),
            kind,
            spec,
            default: None,
            param_key: None,
            label: None,
            props: serde_json::Map::new(),
            on_change: None,
            autoupdate: None,
            invalid: None,
            _native: PhantomData,
        }
    }

    /// Sets the value the widget starts with and omits from the URL.
    pub fn default(mut self, default: T) -> Self {
        self.default = Some(default.into_value());
        self
    }

    /// Reads and writes `param_key` instead of the widget key.
    pub fn param_key(mut self, param_key: impl Into<String>) -> Self {
        self.param_key = Some(param_key.into());
        self
    }

    /// Sets the label; defaults to the widget key.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Passes an extra argument through to the host.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Runs `callback` after each edit, once the query string is updated.
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut ChangeContext<'_>) -> SyncResult<()> + 'static,
    {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Overrides whether the widget writes back to the query string.
    pub fn autoupdate(mut self, autoupdate: bool) -> Self {
        self.autoupdate = Some(autoupdate);
        self
    }

    /// Overrides how unknown multi-choice elements in the URL are handled.
    pub fn invalid_elements(mut self, invalid: InvalidElements) -> Self {
        self.invalid = Some(invalid);
        self
    }

    /// Binds, renders and syncs the widget, returning its live value.
    ///
    /// # Errors
    ///
    /// See [`Form::field`]. A missing default, unusable options or an
    /// unregistered codec tag are configuration errors.
    pub fn show(self) -> SyncResult<T> {
        let Widget {
            form,
            key,
            kind,
            spec,
            default,
            param_key,
            label,
            props,
            on_change,
            autoupdate,
            invalid,
            _native,
        } = self;
        let config = form.engine.config();

        let codec = match spec {
            CodecSpec::Fixed(codec) => codec,
            CodecSpec::Choice(options) => Codec::choice(options).map_err(|source| {
                ConfigurationError::InvalidOptions {
                    key: key.clone(),
                    source,
                }
            })?,
            CodecSpec::Multi(options) => {
                let invalid = invalid.unwrap_or(config.invalid_elements);
                Codec::multi_choice(options, invalid).map_err(|source| {
                    ConfigurationError::InvalidOptions {
                        key: key.clone(),
                        source,
                    }
                })?
            }
            CodecSpec::Registered(tag) => match form.registry.get(&tag) {
                Some(codec) => codec.clone(),
                None => return Err(ConfigurationError::UnknownCodec { key, tag }.into()),
            },
        };

        let mut binding = Binding::new(key, codec, default)?
            .with_autoupdate(autoupdate.unwrap_or(config.autoupdate));
        if let Some(param_key) = param_key {
            binding = binding.with_param_key(param_key);
        }
        let label = label.unwrap_or_else(|| binding.widget_key().to_string());
        let widget_key = binding.widget_key().to_string();
        let expected = binding.codec().value_kind();

        let live = form.field(binding, kind, label, props, on_change)?;
        let found = live.kind();
        T::from_value(live).ok_or_else(|| {
            ConfigurationError::WrongValueType {
                key: widget_key,
                expected,
                found,
            }
            .into()
        })
    }
}
