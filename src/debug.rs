//! Debug tracing for geometry computations
//!
//! Controlled by the CONV_GEOMETRY_DEBUG environment variable: `1` or `true`
//! makes every assembler print the record it produced to stderr.

use std::env;
use std::sync::OnceLock;

pub const DEBUG_ENV_VAR: &str = "CONV_GEOMETRY_DEBUG";

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Whether tracing is on. The variable is read once per process.
#[inline]
pub fn debug_enabled() -> bool {
    *DEBUG_ENABLED.get_or_init(|| flag_enabled(env::var(DEBUG_ENV_VAR).ok().as_deref()))
}

fn flag_enabled(value: Option<&str>) -> bool {
    matches!(value, Some(v) if v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Print to stderr with a `conv-geometry` prefix when CONV_GEOMETRY_DEBUG is set
#[macro_export]
macro_rules! debug_print {
    ($($arg:tt)*) => {
        if $crate::debug::debug_enabled() {
            eprintln!("conv-geometry: {}", format_args!($($arg)*));
        }
    };
}
