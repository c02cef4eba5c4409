//! Calling-convention properties of the bundled `run` entry point, exercised
//! the way a host would: through the exported function pointer.

use polyscript::ffi::{echo_args, ArgvView, CArgs};
use polyscript::{Entry, EntryPoint, HostError, PolyStatus, ENTRY_SYMBOL};
use std::ffi::{c_char, CString};

fn echo(args: &[&str]) -> String {
    let c_args = CArgs::new(args).unwrap();
    let mut out = Vec::new();
    echo_args(&c_args.view(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_entry_symbol_name() {
    assert_eq!(ENTRY_SYMBOL, "run");
}

#[test]
fn test_exported_function_matches_entry_point_type() {
    let f: EntryPoint = polyscript::run;
    let args = CArgs::new(&["x"]).unwrap();
    assert_eq!(unsafe { f(args.argc(), args.argv()) }, 0);
}

#[test]
fn test_zero_arguments_succeed() {
    let entry = Entry::from_fn(ENTRY_SYMBOL, polyscript::run);
    assert_eq!(entry.call::<&str>(&[]).unwrap(), 0);
    assert_eq!(unsafe { polyscript::run(0, std::ptr::null()) }, 0);
}

#[test]
fn test_echo_emits_exactly_argc_lines_in_order() {
    let args = ["one", "two words", "", "--flag", "ünïcode"];
    let out = echo(&args);
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), args.len());
    for (i, (line, arg)) in lines.iter().zip(args.iter()).enumerate() {
        assert_eq!(*line, format!("[rust] argv[{}]: {}", i, arg));
    }
}

#[test]
fn test_repeated_calls_are_identical() {
    let args = ["alpha", "beta", "gamma"];
    let first = echo(&args);
    for _ in 0..10 {
        assert_eq!(echo(&args), first);
    }

    let entry = Entry::from_fn(ENTRY_SYMBOL, polyscript::run);
    let codes: Vec<i32> = (0..10).map(|_| entry.call(&args).unwrap()).collect();
    assert!(codes.iter().all(|&c| c == 0));
}

#[test]
fn test_caller_arguments_are_left_untouched() {
    let owned: Vec<CString> = ["keep", "me"]
        .iter()
        .map(|s| CString::new(*s).unwrap())
        .collect();
    let ptrs: Vec<*const c_char> = owned.iter().map(|s| s.as_ptr()).collect();

    let code = unsafe { polyscript::run(ptrs.len() as i32, ptrs.as_ptr()) };
    assert_eq!(code, 0);

    let view = unsafe { ArgvView::from_raw(ptrs.len() as i32, ptrs.as_ptr()) }.unwrap();
    assert_eq!(view.to_strings_lossy(), vec!["keep", "me"]);
}

#[test]
fn test_malformed_input_returns_status_instead_of_crashing() {
    let first = CString::new("ok").unwrap();
    let with_hole = [first.as_ptr(), std::ptr::null()];

    let cases = [
        (unsafe { polyscript::run(-5, std::ptr::null()) }, PolyStatus::InvalidArgument),
        (unsafe { polyscript::run(1, std::ptr::null()) }, PolyStatus::NullPointer),
        (unsafe { polyscript::run(2, with_hole.as_ptr()) }, PolyStatus::NullPointer),
    ];
    for (code, expected) in cases {
        assert_eq!(PolyStatus::from_code(code), Some(expected));
    }
}

#[test]
fn test_host_surfaces_non_zero_status() {
    unsafe extern "C" fn reject(_argc: i32, _argv: *const *const c_char) -> i32 {
        PolyStatus::InvalidArgument.code()
    }

    let entry = Entry::from_fn("reject", reject);
    let err = entry.call_checked(&["a"]).unwrap_err();
    assert!(matches!(
        err,
        HostError::NonZero {
            code: 2,
            status: Some(PolyStatus::InvalidArgument)
        }
    ));
}
