//! Log facade shared by every firmware crate.
//!
//! Hardware builds enable `defmt`, the desktop simulator enables `tracing`.
//! If both are on, defmt wins. With neither, the macros still evaluate a
//! reference to each argument so call sites do not trip `unused` lints.

#[cfg(feature = "defmt")]
mod backend {
    #[macro_export]
    macro_rules! trace { ($($arg:tt)*) => { $crate::__log::defmt::trace!($($arg)*) }; }
    #[macro_export]
    macro_rules! debug { ($($arg:tt)*) => { $crate::__log::defmt::debug!($($arg)*) }; }
    #[macro_export]
    macro_rules! info { ($($arg:tt)*) => { $crate::__log::defmt::info!($($arg)*) }; }
    #[macro_export]
    macro_rules! warn { ($($arg:tt)*) => { $crate::__log::defmt::warn!($($arg)*) }; }
    #[macro_export]
    macro_rules! error { ($($arg:tt)*) => { $crate::__log::defmt::error!($($arg)*) }; }
}

#[cfg(all(feature = "tracing", not(feature = "defmt")))]
mod backend {
    #[macro_export]
    macro_rules! trace { ($($arg:tt)*) => { $crate::__log::tracing::trace!($($arg)*) }; }
    #[macro_export]
    macro_rules! debug { ($($arg:tt)*) => { $crate::__log::tracing::debug!($($arg)*) }; }
    #[macro_export]
    macro_rules! info { ($($arg:tt)*) => { $crate::__log::tracing::info!($($arg)*) }; }
    #[macro_export]
    macro_rules! warn { ($($arg:tt)*) => { $crate::__log::tracing::warn!($($arg)*) }; }
    #[macro_export]
    macro_rules! error { ($($arg:tt)*) => { $crate::__log::tracing::error!($($arg)*) }; }
}

#[cfg(not(any(feature = "defmt", feature = "tracing")))]
mod backend {
    #[macro_export]
    macro_rules! trace { ($fmt:expr $(, $arg:expr)* $(,)?) => {{ let _ = &$fmt; $( let _ = &$arg; )* }}; }
    #[macro_export]
    macro_rules! debug { ($fmt:expr $(, $arg:expr)* $(,)?) => {{ let _ = &$fmt; $( let _ = &$arg; )* }}; }
    #[macro_export]
    macro_rules! info { ($fmt:expr $(, $arg:expr)* $(,)?) => {{ let _ = &$fmt; $( let _ = &$arg; )* }}; }
    #[macro_export]
    macro_rules! warn { ($fmt:expr $(, $arg:expr)* $(,)?) => {{ let _ = &$fmt; $( let _ = &$arg; )* }}; }
    #[macro_export]
    macro_rules! error { ($fmt:expr $(, $arg:expr)* $(,)?) => {{ let _ = &$fmt; $( let _ = &$arg; )* }}; }
}
