/// Print a line to standard error, ignoring failures.
#[macro_export]
macro_rules! stderr {
    ($fmt:expr) => {{
        use std::io::Write;
        writeln!(::std::io::stderr(), $fmt).ok();
    }};
    ($fmt:expr, $($arg:tt)*) => {{
        use std::io::Write;
        writeln!(::std::io::stderr(), $fmt, $($arg)*).ok();
    }};
}
