// src/macros.rs

//! Instrumentation shorthands.
//!
//! With the `profiling` feature disabled both macros compile to nothing, so
//! instrumented code can stay in place in builds that should not pay for it.

/// Times the rest of the enclosing block under `name`.
///
/// ```no_run
/// fn parse(recorder: &scopetrace::Recorder) {
///     scopetrace::profile_scope!(recorder, "parse");
///     // ...
/// }
/// ```
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! profile_scope {
    ($recorder:expr, $name:expr) => {
        let _scopetrace_scope_timer = $crate::core::timer::ScopedTimer::new(&$recorder, $name);
    };
}

/// Times the rest of the enclosing function under its fully qualified path.
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! profile_function {
    ($recorder:expr) => {
        let _scopetrace_function_timer =
            $crate::core::timer::ScopedTimer::new(&$recorder, $crate::function_name!());
    };
}

/// Disabled build: evaluates nothing but a borrow of the recorder.
#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_scope {
    ($recorder:expr, $name:expr) => {
        let _ = &$recorder;
    };
}

/// Disabled build: evaluates nothing but a borrow of the recorder.
#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_function {
    ($recorder:expr) => {
        let _ = &$recorder;
    };
}

/// Expands to the path of the function it is invoked in, e.g. `my_crate::io::load`.
#[doc(hidden)]
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __scopetrace_here() {}
        fn __scopetrace_type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __scopetrace_type_name_of(__scopetrace_here);
        name.strip_suffix("::__scopetrace_here").unwrap_or(name)
    }};
}
