//! Argument vectors crossing the C boundary.
//!
//! [`ArgvView`] is the callee side: a checked, borrowed view over a
//! caller-owned `(argc, argv)` pair. [`CArgs`] is the host side: owned
//! NUL-terminated copies plus the pointer array handed to the callee.

use crate::error::ArgError;
use std::ffi::{c_char, c_int, CStr, CString};
use std::marker::PhantomData;

/// Borrowed view over a caller-owned argument vector.
///
/// The lifetime ties the view to the duration of the call; nothing in here
/// copies or retains the caller's memory.
#[derive(Debug, Clone, Copy)]
pub struct ArgvView<'a> {
    argv: *const *const c_char,
    len: usize,
    _marker: PhantomData<&'a CStr>,
}

impl<'a> ArgvView<'a> {
    /// An empty view.
    pub fn empty() -> Self {
        Self {
            argv: std::ptr::null(),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Build a view from raw C arguments.
    ///
    /// Every element pointer is checked up front so that later accessors
    /// never observe a null.
    ///
    /// # Safety
    /// When `argc > 0` and `argv` is non-null, `argv` must point to at least
    /// `argc` pointers, each null or pointing to a NUL-terminated string that
    /// stays valid and unmodified for `'a`.
    pub unsafe fn from_raw(argc: c_int, argv: *const *const c_char) -> Result<Self, ArgError> {
        if argc < 0 {
            return Err(ArgError::NegativeCount(argc));
        }
        if argc == 0 {
            return Ok(Self::empty());
        }
        if argv.is_null() {
            return Err(ArgError::NullArray { argc });
        }

        let len = argc as usize;
        let ptrs = std::slice::from_raw_parts(argv, len);
        if let Some(index) = ptrs.iter().position(|p| p.is_null()) {
            return Err(ArgError::NullElement { index });
        }

        Ok(Self {
            argv,
            len,
            _marker: PhantomData,
        })
    }

    /// Number of arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if there are no arguments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the argument at `index`.
    pub fn get(&self, index: usize) -> Option<&'a CStr> {
        if index >= self.len {
            return None;
        }
        // SAFETY: construction checked `argv` and every element up to `len`.
        unsafe { Some(CStr::from_ptr(*self.argv.add(index))) }
    }

    /// Iterate over the arguments in order.
    pub fn iter(&self) -> impl Iterator<Item = &'a CStr> {
        let view = *self;
        (0..view.len).filter_map(move |i| view.get(i))
    }

    /// Copy the arguments out as owned strings, replacing invalid UTF-8.
    pub fn to_strings_lossy(&self) -> Vec<String> {
        self.iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }
}

/// Owned argument vector in C layout, for calling an entry point.
///
/// The pointer array carries a trailing null after the last argument, as C
/// `main` does; [`CArgs::argc`] does not count it.
#[derive(Debug)]
pub struct CArgs {
    // Backing storage for `ptrs`; must not be mutated while `ptrs` is alive.
    _owned: Vec<CString>,
    ptrs: Vec<*const c_char>,
    argc: c_int,
}

/// Convert a host-side argument count to the ABI's `int`.
fn checked_argc(count: usize) -> Result<c_int, ArgError> {
    c_int::try_from(count).map_err(|_| ArgError::TooMany { count })
}

impl CArgs {
    /// Marshal Rust strings into C strings.
    pub fn new<S: AsRef<str>>(args: &[S]) -> Result<Self, ArgError> {
        let argc = checked_argc(args.len())?;
        let owned = args
            .iter()
            .enumerate()
            .map(|(index, s)| {
                CString::new(s.as_ref()).map_err(|_| ArgError::InteriorNul { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut ptrs: Vec<*const c_char> = owned.iter().map(|s| s.as_ptr()).collect();
        ptrs.push(std::ptr::null());

        Ok(Self {
            _owned: owned,
            ptrs,
            argc,
        })
    }

    /// Argument count as passed across the ABI.
    #[inline]
    pub fn argc(&self) -> c_int {
        self.argc
    }

    /// Pointer to the argument array; valid while `self` is alive.
    #[inline]
    pub fn argv(&self) -> *const *const c_char {
        self.ptrs.as_ptr()
    }

    /// Borrow these arguments through the callee-side view.
    pub fn view(&self) -> ArgvView<'_> {
        // `ptrs` holds `argc` non-null pointers into `_owned`, so the checks in
        // `ArgvView::from_raw` hold by construction.
        ArgvView {
            argv: self.argv(),
            len: self.ptrs.len() - 1,
            _marker: PhantomData,
        }
    }
}
