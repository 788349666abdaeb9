pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Fails the enclosing function with `InvalidArgument` unless the condition
/// holds. `$name` names the offending argument.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {
        if !($expr) {
            Err($crate::error::Error::invalid_arg(
                stringify!($name),
                stringify!($expr),
            ))?;
        }
    };
}

/// Fails with `InvalidFormat`: the persisted bytes are inconsistent.
#[macro_export]
macro_rules! verify_data {
    ($name:expr, $expr:expr) => {
        if !($expr) {
            Err($crate::error::Error::from(
                $crate::error::ErrorKind::InvalidFormat {
                    element: stringify!($name).to_string(),
                    message: stringify!($expr).to_string(),
                },
            ))?;
        }
    };
}

/// Fails with `ContractViolation`: the caller fed values that break an
/// ordering or range guarantee of the producer.
#[macro_export]
macro_rules! verify_contract {
    ($name:expr, $expr:expr) => {
        if !($expr) {
            Err($crate::error::Error::contract_violation(
                stringify!($name),
                stringify!($expr),
            ))?;
        }
    };
}
