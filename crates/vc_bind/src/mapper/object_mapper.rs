use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::bind::{Bind, describe};
use crate::context::{Context, Direction, Location};
use crate::converter::{ConversionError, ConvertError, Converter, ErrorKind, Module};
use crate::converters::standard_module;
use crate::error::Error;
use crate::info::TypeDesc;
use crate::mapper::MapperConfig;
use crate::registry::TypeRegistry;
use crate::settings::{SettingRef, Settings};
use crate::value::Value;

// -----------------------------------------------------------------------------
// SettingsArg

/// The settings used by a single [`ObjectMapper::convert`] call.
#[derive(Debug, Clone, Default)]
pub enum SettingsArg {
    /// The mapper's own settings.
    #[default]
    Mapper,
    /// Settings layered over the mapper's settings as globals.
    List(Vec<SettingRef>),
    /// A registry used instead of the mapper's settings.
    Registry(Arc<Settings>),
}

impl From<Vec<SettingRef>> for SettingsArg {
    #[inline]
    fn from(value: Vec<SettingRef>) -> Self {
        Self::List(value)
    }
}

impl From<Arc<Settings>> for SettingsArg {
    #[inline]
    fn from(value: Arc<Settings>) -> Self {
        Self::Registry(value)
    }
}

// -----------------------------------------------------------------------------
// ObjectMapper

/// The entry point of the engine.
///
/// An `ObjectMapper` owns the converter chain, the [`Settings`] and the
/// [`TypeRegistry`]. Everything is configured through `&mut self` before the
/// first conversion, conversions only need `&self` and may run concurrently.
///
/// # Examples
///
/// ```
/// use vc_bind::registry::{FieldDef, TypeDef};
/// use vc_bind::value::Record;
/// use vc_bind::{ObjectMapper, TypeDesc, TypeRegistry, Value};
///
/// let mut registry = TypeRegistry::new();
/// registry.insert(
///     TypeDef::record("app::User")
///         .with_field(FieldDef::new("name", TypeDesc::str()))
///         .with_field(FieldDef::new("age", TypeDesc::optional(TypeDesc::int()))),
/// );
/// let mapper = ObjectMapper::standard(registry);
/// let user = TypeDesc::class("app::User");
///
/// let tree = Value::object([("name", Value::from("ada"))]);
/// let record = mapper.deserialize(&tree, &user).unwrap();
/// assert_eq!(record, Value::Record(Record::new("app::User").with("name", "ada").with("age", Value::None)));
///
/// let back = mapper.serialize(&record, &user).unwrap();
/// assert_eq!(back, Value::object([("name", Value::from("ada")), ("age", Value::None)]));
/// ```
pub struct ObjectMapper {
    module: Module,
    settings: Arc<Settings>,
    registry: TypeRegistry,
    config: MapperConfig,
}

impl ObjectMapper {
    /// Create a mapper without any converter.
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            module: Module::new("ObjectMapper"),
            settings: Arc::new(Settings::new()),
            registry,
            config: MapperConfig::default(),
        }
    }

    /// Create a mapper with the builtin converters, see [`standard_module`].
    pub fn standard(registry: TypeRegistry) -> Self {
        let mut mapper = Self::new(registry);
        mapper.module.register(standard_module());
        mapper
    }

    /// Returns a copy with a different configuration.
    #[inline]
    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns a copy with a different settings registry.
    #[inline]
    pub fn with_settings(mut self, settings: impl Into<Arc<Settings>>) -> Self {
        self.settings = settings.into();
        self
    }

    #[inline]
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    #[inline]
    pub fn module(&self) -> &Module {
        &self.module
    }

    #[inline]
    pub fn module_mut(&mut self) -> &mut Module {
        &mut self.module
    }

    #[inline]
    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Returns the settings for modification, cloning them if they are shared.
    #[inline]
    pub fn settings_mut(&mut self) -> &mut Settings {
        Arc::make_mut(&mut self.settings)
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[inline]
    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    /// Append a converter to the chain.
    pub fn register(&mut self, converter: impl Converter + 'static) -> &mut Self {
        self.module.register(converter);
        self
    }

    /// Prepend a converter to the chain, it is tried before the builtin ones.
    pub fn register_first(&mut self, converter: impl Converter + 'static) -> &mut Self {
        self.module.register_first(converter);
        self
    }

    // -------------------------------------------------------------------------
    // Conversion

    /// Convert `value` as `datatype` in the given direction.
    ///
    /// Forward references in `datatype` are resolved against the registry
    /// first. `location` is attached to the root context and shows up in
    /// error traces.
    pub fn convert(
        &self,
        direction: Direction,
        value: &Value,
        datatype: &TypeDesc,
        location: Option<Location>,
        settings: SettingsArg,
    ) -> Result<Value, ConversionError> {
        let layered;
        let settings: &Settings = match &settings {
            SettingsArg::Mapper => &self.settings,
            SettingsArg::List(list) => {
                layered = self.settings.with_overrides(list.iter().cloned());
                &layered
            }
            SettingsArg::Registry(registry) => registry,
        };

        let root = |datatype: TypeDesc| {
            Context::new(
                direction,
                Cow::Borrowed(value),
                datatype,
                settings,
                &self.registry,
                &self.module,
                &self.config,
            )
            .with_location(location.clone().unwrap_or_default())
        };

        let datatype = match self.registry.resolve_refs(datatype, None) {
            Ok(resolved) => resolved,
            Err(err) => {
                let ctx = root(datatype.clone());
                return Err(ConversionError::from_schema(format!("{self:?}"), &ctx, &err));
            }
        };

        log::debug!("{}: `{datatype}` from {}", direction.name(), value.kind_name());
        let ctx = root(datatype);
        match ctx.convert() {
            Ok(value) => Ok(value),
            Err(ConvertError::Failed(err)) => Err(*err),
            Err(ConvertError::NotApplicable) => {
                let message = format!(
                    "no {}r for `{}` and payload of type `{}`",
                    direction.name(),
                    ctx.datatype,
                    value.kind_name(),
                );
                Err(ConversionError::new(
                    format!("{self:?}"),
                    &ctx,
                    ErrorKind::NoMatchingConverter,
                    message,
                ))
            }
        }
    }

    /// Serialize a runtime value into a tree.
    #[inline]
    pub fn serialize(&self, value: &Value, datatype: &TypeDesc) -> Result<Value, ConversionError> {
        self.convert(Direction::Serialize, value, datatype, None, SettingsArg::Mapper)
    }

    /// Deserialize a tree into a runtime value.
    #[inline]
    pub fn deserialize(&self, value: &Value, datatype: &TypeDesc) -> Result<Value, ConversionError> {
        self.convert(Direction::Deserialize, value, datatype, None, SettingsArg::Mapper)
    }

    // -------------------------------------------------------------------------
    // Typed helpers

    /// Serialize a [`Bind`] value into a tree.
    ///
    /// The types of `T` must be registered in the mapper's registry, see
    /// [`TypeRegistry::register`].
    pub fn to_value<T: Bind>(&self, value: &T) -> Result<Value, Error> {
        Ok(self.serialize(&value.to_value(), &describe::<T>())?)
    }

    /// Deserialize a tree into a [`Bind`] value.
    pub fn from_value<T: Bind>(&self, tree: &Value) -> Result<T, Error> {
        self.from_value_at(tree, None)
    }

    fn from_value_at<T: Bind>(&self, tree: &Value, location: Option<Location>) -> Result<T, Error> {
        let value = self.convert(
            Direction::Deserialize,
            tree,
            &describe::<T>(),
            location,
            SettingsArg::Mapper,
        )?;
        Ok(T::from_value(value)?)
    }

    pub fn to_json<T: Bind>(&self, value: &T) -> Result<serde_json::Value, Error> {
        Ok(self.to_value(value)?.to_json()?)
    }

    pub fn from_json<T: Bind>(&self, json: serde_json::Value) -> Result<T, Error> {
        self.from_value(&Value::from_json(json))
    }

    /// Serialize a [`Bind`] value into compact JSON text.
    pub fn to_string<T: Bind>(&self, value: &T) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.to_json(value)?)?)
    }

    /// Serialize a [`Bind`] value into indented JSON text.
    pub fn to_string_pretty<T: Bind>(&self, value: &T) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&self.to_json(value)?)?)
    }

    /// Deserialize a [`Bind`] value from JSON text.
    pub fn from_str<T: Bind>(&self, text: &str) -> Result<T, Error> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        self.from_value(&Value::from_json(json))
    }

    /// Like [`from_str`](Self::from_str), error traces name `filename`.
    pub fn from_str_at<T: Bind>(&self, text: &str, filename: &str) -> Result<T, Error> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        self.from_value_at(&Value::from_json(json), Some(Location::file(filename)))
    }
}

impl fmt::Debug for ObjectMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ObjectMapper")
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use super::*;
    use crate::registry::{FieldDef, TypeDef};
    use crate::settings::{Priority, Strict};
    use crate::value::Record;

    fn mapper() -> ObjectMapper {
        let mut registry = TypeRegistry::new();
        registry.insert(TypeDef::record("t::Port").with_field(FieldDef::new("port", TypeDesc::int())));
        ObjectMapper::standard(registry)
    }

    #[test]
    fn settings_list_layers_over_mapper_settings() {
        let mut mapper = mapper();
        mapper.settings_mut().add_global(Strict::new(true));
        let tree = Value::from("8080");

        assert!(mapper.deserialize(&tree, &TypeDesc::int()).is_err());

        let lenient = vec![Strict::new(false).with_priority(Priority::High).into()];
        let value = mapper
            .convert(Direction::Deserialize, &tree, &TypeDesc::int(), None, lenient.into())
            .unwrap();
        assert_eq!(value, Value::Int(8080));

        // The mapper's own registry is untouched.
        assert!(mapper.deserialize(&tree, &TypeDesc::int()).is_err());
    }

    #[test]
    fn equal_priorities_resolve_to_the_first_found() {
        let mut settings = Settings::new();
        settings.add_global(Strict::new(false)).add_global(Strict::new(true));
        let mapper = mapper().with_settings(settings);

        let value = mapper.deserialize(&Value::from("1"), &TypeDesc::int()).unwrap();
        assert_eq!(value, Value::Int(1));
    }

    #[test]
    fn registry_argument_replaces_mapper_settings() {
        let mut mapper = mapper();
        mapper.settings_mut().add_global(Strict::new(false));

        let strict = Arc::new({
            let mut settings = Settings::new();
            settings.add_global(Strict::new(true));
            settings
        });
        let result = mapper.convert(
            Direction::Deserialize,
            &Value::from("1"),
            &TypeDesc::int(),
            None,
            strict.into(),
        );
        assert!(matches!(result.unwrap_err().kind, ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn location_shows_in_trace() {
        let mapper = mapper();
        let tree = Value::object([("port", Value::from("x"))]);
        let err = mapper
            .convert(
                Direction::Deserialize,
                &tree,
                &TypeDesc::class("t::Port"),
                Some(Location::file("app.json")),
                SettingsArg::Mapper,
            )
            .unwrap_err();

        let text = err.to_string();
        assert!(text.contains("In \"app.json\""), "{text}");
        assert!(text.contains(".port: int"), "{text}");
    }

    #[test]
    fn forward_references_resolve_at_the_root() {
        let mapper = mapper();
        let tree = Value::object([("port", Value::Int(1))]);
        let value = mapper.deserialize(&tree, &TypeDesc::reference("t::Port")).unwrap();
        assert_eq!(value, Value::Record(Record::new("t::Port").with("port", 1)));

        let err = mapper.deserialize(&tree, &TypeDesc::reference("t::Missing")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedType);
        assert_eq!(err.origin, "ObjectMapper");
    }

    #[test]
    fn empty_mapper_matches_nothing() {
        let mapper = ObjectMapper::new(TypeRegistry::empty());
        let err = mapper.deserialize(&Value::Int(1), &TypeDesc::int()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoMatchingConverter);
        assert_eq!(err.message, "no deserializer for `int` and payload of type `int`");
    }

    #[test]
    fn register_first_takes_precedence() {
        let mut mapper = mapper();
        mapper.register_first(crate::converter::FnConverter::new("Zero", |ctx| {
            match ctx.datatype.strip_annotated() {
                TypeDesc::Primitive(crate::info::PrimitiveKind::Int) => Ok(Value::Int(0)),
                _ => Err(ConvertError::NotApplicable),
            }
        }));
        assert_eq!(mapper.deserialize(&Value::Int(7), &TypeDesc::int()).unwrap(), Value::Int(0));
        assert_eq!(
            mapper.deserialize(&Value::from("s"), &TypeDesc::str()).unwrap(),
            Value::from("s")
        );
        assert_eq!(mapper.module().name(), "ObjectMapper");
        assert_eq!(mapper.registry().get("t::Port").unwrap().name().to_string(), "t::Port");
    }
}
