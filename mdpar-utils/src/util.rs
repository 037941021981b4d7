use std::fmt;
use std::process;

/// Unwrap a result or exit the process with an error message.
pub trait OrExit<T> {
    fn or_exit(self) -> T;
}

impl<T, E> OrExit<T> for ::std::result::Result<T, E>
where
    E: fmt::Display,
{
    fn or_exit(self) -> T {
        match self {
            Ok(value) => value,
            Err(error) => {
                stderr!("Error: {}", error);
                process::exit(1)
            }
        }
    }
}
