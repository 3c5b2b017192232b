/// Options of an [`ObjectMapper`](crate::ObjectMapper) that are not expressed as settings.
///
/// `strict` and `serialize_defaults` are fallbacks, a [`Strict`] or
/// [`SerializeDefaults`] setting visible to a node takes precedence.
///
/// [`Strict`]: crate::settings::Strict
/// [`SerializeDefaults`]: crate::settings::SerializeDefaults
///
/// # Examples
///
/// ```
/// use vc_bind::{MapperConfig, ObjectMapper, TypeRegistry};
///
/// let config = MapperConfig {
///     strict: false,
///     ..MapperConfig::default()
/// };
/// let mapper = ObjectMapper::standard(TypeRegistry::new()).with_config(config);
/// assert_eq!(mapper.config().max_depth, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperConfig {
    /// The deepest context a conversion may create.
    pub max_depth: usize,
    /// Whether lossy primitive coercions are disabled by default.
    pub strict: bool,
    /// Whether fields equal to their default are serialized by default.
    pub serialize_defaults: bool,
}

impl MapperConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 256;
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            strict: true,
            serialize_defaults: true,
        }
    }
}
