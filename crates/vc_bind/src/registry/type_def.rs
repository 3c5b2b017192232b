use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use indexmap::IndexMap;

use crate::info::{TypeDesc, TypeName};
use crate::schema::{Constructor, DefaultValue};
use crate::settings::SettingRef;
use crate::utils::HashMap;
use crate::value::Value;

// -----------------------------------------------------------------------------
// FieldDef

/// A field declared by a record definition.
///
/// Only the fields a record declares itself are listed, inherited fields are
/// found by walking its bases.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    /// May contain [`TypeDesc::Param`] and [`TypeDesc::Ref`], resolved during schema derivation.
    pub datatype: TypeDesc,
    pub default: Option<DefaultValue>,
    /// Fields with `init == false` are not part of the schema.
    pub init: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, datatype: TypeDesc) -> Self {
        Self {
            name: name.into(),
            datatype,
            default: None,
            init: true,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    pub fn with_default_factory(mut self, factory: fn() -> Value) -> Self {
        self.default = Some(DefaultValue::Factory(factory));
        self
    }

    /// Exclude the field from (de)serialization.
    pub fn without_init(mut self) -> Self {
        self.init = false;
        self
    }
}

// -----------------------------------------------------------------------------
// EnumDef

/// A member of an enum definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: Arc<str>,
    pub aliases: Vec<Arc<str>>,
    /// The integer of an integer backed enum.
    pub value: Option<i64>,
}

impl EnumMember {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            value: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    /// Returns the serialized name: the first alias, or the member name.
    pub fn serialized_name(&self) -> &str {
        self.aliases.first().unwrap_or(&self.name)
    }
}

/// The members of an enum definition.
#[derive(Debug, Clone, Default)]
pub struct EnumDef {
    pub members: Vec<EnumMember>,
    /// Serialize members as their integer value.
    pub int_backed: bool,
}

impl EnumDef {
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| &*m.name == name)
    }

    /// Match by alias first, then by name.
    pub fn find(&self, text: &str) -> Option<&EnumMember> {
        self.members
            .iter()
            .find(|m| m.aliases.iter().any(|a| &**a == text))
            .or_else(|| self.member(text))
    }

    pub fn find_value(&self, value: i64) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.value == Some(value))
    }
}

// -----------------------------------------------------------------------------
// RecordDef

/// The fields and constructor of a record definition.
#[derive(Clone, Default)]
pub struct RecordDef {
    pub fields: Vec<FieldDef>,
    /// Builds the runtime value from the converted keyword map.
    ///
    /// Defaults to building a [`Record`](crate::value::Record) of the schema's type.
    pub constructor: Option<Constructor>,
}

impl fmt::Debug for RecordDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDef")
            .field("fields", &self.fields)
            .field("constructor", &self.constructor.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// TypeDef

/// The shape of a registered type.
#[derive(Debug, Clone)]
pub enum TypeKind {
    Record(RecordDef),
    Enum(EnumDef),
    /// A leaf type handled by a dedicated converter, such as `StringifyConverter`.
    Opaque,
}

/// The definition of a registered type.
///
/// # Examples
///
/// ```
/// use vc_bind::TypeDesc;
/// use vc_bind::registry::{FieldDef, TypeDef};
///
/// let def = TypeDef::record("app::Page")
///     .with_param("T")
///     .with_field(FieldDef::new("items", TypeDesc::list(TypeDesc::param("T"))))
///     .with_field(FieldDef::new("cursor", TypeDesc::optional(TypeDesc::str())));
///
/// assert_eq!(def.name(), "app::Page");
/// assert_eq!(def.as_record().unwrap().fields.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TypeDef {
    name: TypeName,
    params: Vec<Arc<str>>,
    bases: Vec<TypeDesc>,
    settings: Vec<SettingRef>,
    kind: TypeKind,
}

impl TypeDef {
    fn new(name: TypeName, kind: TypeKind) -> Self {
        Self {
            name,
            params: Vec::new(),
            bases: Vec::new(),
            settings: Vec::new(),
            kind,
        }
    }

    /// Define a record type.
    pub fn record(name: impl Into<TypeName>) -> Self {
        Self::new(name.into(), TypeKind::Record(RecordDef::default()))
    }

    /// Define an enum type.
    pub fn enumeration(name: impl Into<TypeName>) -> Self {
        Self::new(name.into(), TypeKind::Enum(EnumDef::default()))
    }

    /// Define an opaque leaf type.
    pub fn opaque(name: impl Into<TypeName>) -> Self {
        Self::new(name.into(), TypeKind::Opaque)
    }

    /// Declare a generic parameter, referenced by [`TypeDesc::Param`].
    pub fn with_param(mut self, name: &str) -> Self {
        self.params.push(name.into());
        self
    }

    /// Declare a base type. Bases may use this type's parameters.
    pub fn with_base(mut self, base: TypeDesc) -> Self {
        self.bases.push(base);
        self
    }

    /// Declare a setting on the type, visible to every node of this type.
    pub fn with_setting(mut self, setting: impl Into<SettingRef>) -> Self {
        self.settings.push(setting.into());
        self
    }

    /// Add a field. Ignored for non-record definitions.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        if let TypeKind::Record(record) = &mut self.kind {
            record.fields.push(field);
        }
        self
    }

    /// Set the record constructor. Ignored for non-record definitions.
    pub fn with_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(IndexMap<String, Value>) -> Result<Value, String> + Send + Sync + 'static,
    {
        if let TypeKind::Record(record) = &mut self.kind {
            record.constructor = Some(Arc::new(constructor));
        }
        self
    }

    /// Add an enum member. Ignored for non-enum definitions.
    pub fn with_member(mut self, member: EnumMember) -> Self {
        if let TypeKind::Enum(def) = &mut self.kind {
            def.members.push(member);
        }
        self
    }

    /// Serialize enum members as their integer value.
    pub fn with_int_backed(mut self) -> Self {
        if let TypeKind::Enum(def) = &mut self.kind {
            def.int_backed = true;
        }
        self
    }

    #[inline]
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    #[inline]
    pub fn params(&self) -> &[Arc<str>] {
        &self.params
    }

    #[inline]
    pub fn bases(&self) -> &[TypeDesc] {
        &self.bases
    }

    #[inline]
    pub fn settings(&self) -> &[SettingRef] {
        &self.settings
    }

    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn as_record(&self) -> Option<&RecordDef> {
        match &self.kind {
            TypeKind::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDef> {
        match &self.kind {
            TypeKind::Enum(def) => Some(def),
            _ => None,
        }
    }

    /// Map this type's parameters to `args`, missing arguments become [`TypeDesc::Any`].
    pub fn param_map(&self, args: &[TypeDesc]) -> HashMap<Arc<str>, TypeDesc> {
        self.params
            .iter()
            .enumerate()
            .map(|(idx, param)| (param.clone(), args.get(idx).cloned().unwrap_or(TypeDesc::Any)))
            .collect()
    }
}
