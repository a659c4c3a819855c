pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Verifies an argument precondition, returning `ErrorKind::InvalidArgument`
/// from the enclosing function when it does not hold.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

/// Verifies a comparison condition, returning `ErrorKind::AssertionFailed`
/// with the formatted message from the enclosing function when it does not hold.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {{
        if !$cond {
            return Err($crate::error::Error::assertion(format!($($arg)+)));
        }
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    fn checked(count: usize) -> super::Result<usize> {
        verify_arg!(count, count > 0);
        Ok(count)
    }

    fn compared(a: i32, b: i32) -> super::Result<()> {
        ensure!(a == b, "{a} != {b}");
        Ok(())
    }

    #[test]
    fn test_verify_arg() {
        assert_eq!(checked(3).unwrap(), 3);
        let err = checked(0).unwrap_err();
        match err.kind() {
            ErrorKind::InvalidArgument { name, message } => {
                assert_eq!(name, "count");
                assert_eq!(message, "count > 0");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_ensure() {
        assert!(compared(1, 1).is_ok());
        let err = compared(1, 2).unwrap_err();
        assert!(err.is_assertion());
        assert_eq!(err.to_string(), "1 != 2");
    }
}
