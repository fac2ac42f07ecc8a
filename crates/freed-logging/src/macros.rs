//! ---
//! freed_section: "03-persistence-logging"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Context-enriched logging macros."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
//! Logging macros that attach a [`LogContext`](crate::LogContext).

#[doc(hidden)]
#[macro_export]
macro_rules! __freed_event {
    ($level:expr, $ctx:expr, $($field:ident = $value:expr),* ; $($arg:tt)+) => {{
        let ctx: &$crate::LogContext = $ctx;
        tracing::event!(
            $level,
            session = ctx.session.unwrap_or(""),
            role = ctx.role_str(),
            camera = ctx.camera.map(u64::from).unwrap_or_default(),
            sequence = ctx.sequence.unwrap_or_default(),
            $($field = $value,)*
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit an informational log enriched with session context.
#[macro_export]
macro_rules! freed_info {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__freed_event!(tracing::Level::INFO, &$ctx, ; $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__freed_event!(tracing::Level::INFO, &$crate::LogContext::default(), ; $($arg)+)
    };
}

/// Emit a debug log enriched with session context.
#[macro_export]
macro_rules! freed_debug {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__freed_event!(tracing::Level::DEBUG, &$ctx, ; $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__freed_event!(tracing::Level::DEBUG, &$crate::LogContext::default(), ; $($arg)+)
    };
}

/// Emit a warning enriched with session context.
#[macro_export]
macro_rules! freed_warn {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__freed_event!(tracing::Level::WARN, &$ctx, ; $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__freed_event!(tracing::Level::WARN, &$crate::LogContext::default(), ; $($arg)+)
    };
}

/// Emit an error log enriched with session context.
#[macro_export]
macro_rules! freed_error {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__freed_event!(tracing::Level::ERROR, &$ctx, ; $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__freed_event!(tracing::Level::ERROR, &$crate::LogContext::default(), ; $($arg)+)
    };
}
