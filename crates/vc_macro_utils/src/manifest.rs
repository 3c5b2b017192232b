use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// The dependency table of the crate invoking a proc-macro.
///
/// Generated code must name `vc_bind` the way the invoking crate sees it:
///
/// 1. If `vc_bind` itself is a dependency, return `::vc_bind`.
/// 2. If the requested crate name begins with `vc_` and the facade crate
///    `vc_databind` is a dependency, return `::vc_databind::<short_name>`
///    (e.g. `vc_bind` -> `::vc_databind::bind`).
/// 3. Repeat step 1-2 in `dev-dependencies`.
/// 4. Otherwise, fall back to the absolute path `::crate_name`.
///
/// A crate referring to itself can add `extern crate self as vc_bind;` in its
/// root so that the fallback path resolves.
///
/// # Example
///
/// ```rust
/// # use vc_macro_utils::Manifest;
/// let path: syn::Path = Manifest::shared(|m| m.get_crate_path("vc_bind"));
/// ```
#[derive(Debug)]
pub struct Manifest {
    /// `None` if the manifest cannot be found or parsed.
    pub manifest: Option<Document<Box<str>>>,
    pub modified_time: SystemTime,
}

const FACADE_NAME: &str = "vc_databind";
const PREFIX: &str = "vc_";

impl Manifest {
    #[inline(never)]
    fn manifest_path() -> Option<PathBuf> {
        let mut path = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR")?);
        path.push("Cargo.toml");
        Some(path)
    }

    #[inline(never)]
    fn read(path: &PathBuf) -> Option<Self> {
        let modified_time = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
        let text = std::fs::read_to_string(path).ok()?.into_boxed_str();
        let manifest = Document::parse(text).ok()?;
        Some(Self {
            manifest: Some(manifest),
            modified_time,
        })
    }

    fn absolute(name: &str) -> syn::Path {
        let ident = syn::Ident::new(name, proc_macro2_span());
        let mut path = syn::Path::from(ident);
        path.leading_colon = Some(Default::default());
        path
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(Self::absolute(name));
        }
        let module = name.strip_prefix(PREFIX)?;
        if deps.contains_key(FACADE_NAME) {
            let mut path = Self::absolute(FACADE_NAME);
            path.segments
                .push(syn::Ident::new(module, proc_macro2_span()).into());
            return Some(path);
        }
        None
    }

    /// Return the [`syn::Path`] naming the crate `name` from the invoking crate.
    ///
    /// See the type level documentation for the resolution order.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        let Some(manifest) = &self.manifest else {
            return Self::absolute(name);
        };
        for table in ["dependencies", "dev-dependencies"] {
            if let Some(Item::Table(deps)) = manifest.get(table)
                && let Some(path) = Self::find_in_deps(deps, name)
            {
                return path;
            }
        }
        Self::absolute(name)
    }

    /// Run `func` with the cached manifest of the invoking crate.
    ///
    /// The manifest is re-read when its modification time changes. If it
    /// cannot be found or parsed, `func` receives an empty manifest and every
    /// crate resolves to its absolute path.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let Some(path) = Self::manifest_path() else {
            return func(&Self::empty());
        };

        let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
        let modified_time = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
        if let Some(manifest) = manifests.get(&path)
            && Some(manifest.modified_time) == modified_time
        {
            return func(manifest);
        }
        drop(manifests);

        let Some(manifest) = Self::read(&path) else {
            return func(&Self::empty());
        };
        let result = func(&manifest);
        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);
        result
    }

    fn empty() -> Self {
        Self {
            manifest: None,
            modified_time: SystemTime::UNIX_EPOCH,
        }
    }
}

#[inline]
fn proc_macro2_span() -> proc_macro2::Span {
    proc_macro2::Span::call_site()
}
