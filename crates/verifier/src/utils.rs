//! Utilities for collaborator dispatch.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Returns the type name without its module path (generic arguments are kept verbatim).
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let name = std::any::type_name::<T>();
    let end = name.find('<').unwrap_or(name.len());
    match name[..end].rfind("::") {
        Some(idx) => &name[idx + 2..],
        None => name,
    }
}

/// Returns the message of a panic payload (if it's a string).
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|msg| (*msg).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}

/// Runs a collaborator callback, converting both returned errors and panics into messages.
pub fn catch_failure<T, F>(f: F) -> Result<T, String>
where
    F: FnOnce() -> anyhow::Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(format!("{error:#}")),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}
