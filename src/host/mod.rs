//! Host side of the native module convention.
//!
//! Loads a shared library, resolves its entry point and calls it with
//! marshalled arguments.
//!
//! ```no_run
//! use polyscript::host::NativeModule;
//!
//! let module = NativeModule::open("target/release/libpolyscript.so")?;
//! let code = module.entry("run")?.call(&["hello", "world"])?;
//! assert_eq!(code, 0);
//! # Ok::<(), polyscript::HostError>(())
//! ```

use crate::error::HostError;
use crate::ffi::args::CArgs;
use crate::ffi::types::{EntryPoint, PolyStatus};
use libloading::Library;
use std::ffi::c_int;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A loaded native module.
#[derive(Debug)]
pub struct NativeModule {
    path: PathBuf,
    library: Library,
}

impl NativeModule {
    /// Load a shared library from `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref().to_path_buf();
        // SAFETY: loading runs the library's initializers; the caller chooses
        // which library to trust.
        let library = unsafe { Library::new(&path) }.map_err(|source| HostError::Load {
            path: path.clone(),
            source,
        })?;
        log::debug!("event=module_loaded path={}", path.display());
        Ok(Self { path, library })
    }

    /// Path the module was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve an entry point by symbol name.
    ///
    /// The symbol is assumed to have the [`EntryPoint`] signature; there is no
    /// way to check this at runtime.
    pub fn entry(&self, symbol: &str) -> Result<Entry<'_>, HostError> {
        // SAFETY: the convention fixes the symbol's signature to `EntryPoint`.
        let func = unsafe { self.library.get::<EntryPoint>(symbol.as_bytes()) }.map_err(
            |source| HostError::Symbol {
                symbol: symbol.to_string(),
                source,
            },
        )?;
        Ok(Entry {
            func: *func,
            name: symbol.to_string(),
            _library: PhantomData,
        })
    }
}

/// A resolved entry point.
///
/// Borrows the module it came from, so it cannot be called after the
/// library is unloaded.
#[derive(Debug, Clone)]
pub struct Entry<'lib> {
    func: EntryPoint,
    name: String,
    _library: PhantomData<&'lib Library>,
}

impl Entry<'static> {
    /// Wrap an entry point linked into this process.
    pub fn from_fn(name: impl Into<String>, func: EntryPoint) -> Self {
        Self {
            func,
            name: name.into(),
            _library: PhantomData,
        }
    }
}

impl Entry<'_> {
    /// Symbol name of this entry point.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the entry point and return its raw status code.
    pub fn call<S: AsRef<str>>(&self, args: &[S]) -> Result<c_int, HostError> {
        let c_args = CArgs::new(args)?;
        log::debug!("event=entry_invoke symbol={} argc={}", self.name, c_args.argc());
        // SAFETY: `c_args` outlives the call and matches the declared layout.
        let code = unsafe { (self.func)(c_args.argc(), c_args.argv()) };
        log::debug!("event=entry_return symbol={} code={}", self.name, code);
        Ok(code)
    }

    /// Call the entry point, treating any non-zero return as an error.
    pub fn call_checked<S: AsRef<str>>(&self, args: &[S]) -> Result<(), HostError> {
        match self.call(args)? {
            0 => Ok(()),
            code => Err(HostError::NonZero {
                code,
                status: PolyStatus::from_code(code),
            }),
        }
    }
}

/// Load `lib`, resolve `symbol` and call it with `args`.
///
/// Succeeds only when the entry point returns 0.
pub fn run_native<S: AsRef<str>>(
    lib: impl AsRef<Path>,
    symbol: &str,
    args: &[S],
) -> Result<(), HostError> {
    let module = NativeModule::open(lib)?;
    module.entry(symbol)?.call_checked(args)
}
