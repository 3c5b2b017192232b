//! The converter interface and converter chains.
//!
//! A [`Converter`] handles a subset of contexts and returns
//! [`ConvertError::NotApplicable`] for the rest. A [`Module`] chains
//! converters and aggregates their failures into one [`ConversionError`].

// -----------------------------------------------------------------------------
// Modules

mod converter;
mod error;
mod module;

// -----------------------------------------------------------------------------
// Exports

pub use converter::{ConvertError, ConvertResult, Converter, FnConverter};
pub use error::{ConversionError, ErrorKind};
pub use module::Module;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;
    use alloc::format;
    use alloc::string::ToString;

    use super::*;
    use crate::context::{Context, Direction};
    use crate::info::TypeDesc;
    use crate::mapper::MapperConfig;
    use crate::registry::TypeRegistry;
    use crate::settings::Settings;
    use crate::value::Value;

    fn failing(name: &'static str, message: &'static str) -> FnConverter {
        FnConverter::new(name, move |ctx| Err(ctx.error(format_args!("{name}"), ErrorKind::Invalid, message)))
    }

    fn skipping(name: &'static str) -> FnConverter {
        FnConverter::new(name, |_| Err(ConvertError::NotApplicable))
    }

    fn run(module: &Module, value: Value) -> ConvertResult {
        run_with(module, value, &MapperConfig::default())
    }

    fn run_with(module: &Module, value: Value, config: &MapperConfig) -> ConvertResult {
        let settings = Settings::new();
        let registry = TypeRegistry::empty();
        let ctx = Context::new(
            Direction::Deserialize,
            Cow::Owned(value),
            TypeDesc::int(),
            &settings,
            &registry,
            module,
            config,
        );
        ctx.convert()
    }

    #[test]
    fn first_success_wins() {
        let module = Module::new("test")
            .with(skipping("Skip"))
            .with(FnConverter::new("One", |_| Ok(Value::Int(1))))
            .with(FnConverter::new("Two", |_| Ok(Value::Int(2))));
        assert_eq!(run(&module, Value::None).unwrap(), Value::Int(1));
    }

    #[test]
    fn single_failure_is_propagated() {
        let module = Module::new("test").with(skipping("Skip")).with(failing("Bad", "bad value"));
        let err = run(&module, Value::None).unwrap_err().into_failure().unwrap();
        assert_eq!(err.origin, "Bad");
        assert_eq!(err.message, "bad value");
        assert_eq!(err.kind, ErrorKind::Invalid);
    }

    #[test]
    fn failures_are_aggregated() {
        let module = Module::new("test").with(failing("A", "first")).with(failing("B", "second"));
        let err = run(&module, Value::from("x")).unwrap_err().into_failure().unwrap();

        assert_eq!(err.kind, ErrorKind::NoMatchingConverter);
        assert_eq!(err.origin, r#"Module("test")"#);
        assert_eq!(err.message, "no deserializer for `int` and payload of type `str`");
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.errors[0].0, "A");
        assert_eq!(err.errors[1].1.message, "second");

        let text = err.to_string();
        assert!(text.starts_with("no deserializer for `int`"));
        assert!(text.contains("\n\nTrace:\n    $: int"));
        assert!(text.contains("The following errors have been reported by converters:\n\n  A: first"));
    }

    #[test]
    fn nothing_applicable_is_no_matching_converter() {
        let module = Module::new("empty");
        let err = run(&module, Value::None).unwrap_err().into_failure().unwrap();
        assert_eq!(err.kind, ErrorKind::NoMatchingConverter);
        assert!(err.errors.is_empty());
    }

    #[test]
    fn nested_modules_are_flattened() {
        let inner = Module::new("inner").with(failing("A", "first"));
        let outer = Module::new("outer").with(inner).with(failing("B", "second"));

        let err = run(&outer, Value::None).unwrap_err().into_failure().unwrap();
        let names: Vec<_> = err.errors.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(format!("{outer:?}"), r#"Module("outer")"#);
    }

    #[test]
    fn short_circuiting_failure_ends_the_chain() {
        #[derive(Debug)]
        struct Gate;

        impl Converter for Gate {
            fn convert(&self, ctx: &Context<'_>) -> ConvertResult {
                Err(ctx.error(self, ErrorKind::Invalid, "closed"))
            }

            fn short_circuits(&self) -> bool {
                true
            }
        }

        let module = Module::new("test")
            .with(failing("A", "first"))
            .with(Gate)
            .with(FnConverter::new("One", |_| Ok(Value::Int(1))));
        let err = run(&module, Value::None).unwrap_err().into_failure().unwrap();
        assert_eq!(err.origin, "Gate");
        assert_eq!(err.message, "closed");
    }

    #[test]
    fn register_first_prepends() {
        let mut module = Module::new("test");
        module.register(FnConverter::new("Two", |_| Ok(Value::Int(2))));
        module.register_first(FnConverter::new("One", |_| Ok(Value::Int(1))));
        assert_eq!(module.len(), 2);
        assert_eq!(run(&module, Value::None).unwrap(), Value::Int(1));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let recurse = FnConverter::new("Recurse", |ctx| {
            let child = ctx.spawn(&ctx.value, ctx.datatype.clone(), 0usize);
            child.convert()
        });
        let module = Module::new("test").with(recurse);
        let config = MapperConfig {
            max_depth: 8,
            ..MapperConfig::default()
        };
        let err = run_with(&module, Value::None, &config).unwrap_err().into_failure().unwrap();
        assert_eq!(err.kind, ErrorKind::DepthExceeded);
        assert_eq!(err.trace.frames.len(), 10);
        assert!(err.to_string().contains("[0]: int"));
    }
}
