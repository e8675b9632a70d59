use std::cell::RefCell;

thread_local! {
    static LOG_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Scope guard that sets the logging context and restores the previous one when dropped.
///
/// # Examples
///
/// ```rust
/// use pki_sig::logger::{get_context, LogContext};
///
/// {
///     let _ctx = LogContext::new("EcdsaSignature");
///     assert_eq!(get_context().as_deref(), Some("[EcdsaSignature]"));
/// }
/// assert_eq!(get_context(), None);
/// ```
pub struct LogContext {
    previous: Option<String>,
}

impl LogContext {
    /// Opens a new logging context scope.
    #[must_use]
    pub fn new(module: &str) -> Self {
        let previous = LOG_CONTEXT.with(|ctx| ctx.borrow_mut().replace(format!("[{module}]")));
        Self { previous }
    }
}

impl Drop for LogContext {
    fn drop(&mut self) {
        LOG_CONTEXT.with(|ctx| {
            (*ctx.borrow_mut()).clone_from(&self.previous);
        });
    }
}

/// Returns the current logging context, if any.
#[must_use]
pub fn get_context() -> Option<String> {
    LOG_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Runs a block inside a logging context.
///
/// ```rust
/// use pki_sig::with_log_context;
///
/// let prefix = with_log_context!("Codec" => {
///     pki_sig::logger::get_context()
/// });
/// assert_eq!(prefix.as_deref(), Some("[Codec]"));
/// ```
#[macro_export]
macro_rules! with_log_context {
    ($module:expr => $block:block) => {{
        let _ctx = $crate::logger::LogContext::new($module);
        $block
    }};
}

/// Sets a logging context for the current scope; keep the returned guard alive.
#[macro_export]
macro_rules! set_log_context {
    ($module:expr) => {
        $crate::logger::LogContext::new($module)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_contexts_restore_previous() {
        let _outer = LogContext::new("Outer");
        {
            let _inner = set_log_context!("Inner");
            assert_eq!(get_context().as_deref(), Some("[Inner]"));
        }
        assert_eq!(get_context().as_deref(), Some("[Outer]"));
    }

    #[test]
    fn test_with_log_context_clears_after_block() {
        let seen = with_log_context!("Scoped" => { get_context() });
        assert_eq!(seen.as_deref(), Some("[Scoped]"));
        assert_eq!(get_context(), None);
    }
}
