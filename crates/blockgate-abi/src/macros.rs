//! Helper macros for ABI function generation.
//!
//! Provides `constant_accessors!`, which turns a list of compile-time
//! constants into zero-argument `#[unsafe(no_mangle)] extern "C"` getters
//! plus a name-indexed table of those getters.

/// Generate one exported getter per constant.
///
/// # Usage
///
/// ```ignore
/// constant_accessors! {
///     blockgate_zmq_noblock => ZMQ_NOBLOCK,
///     blockgate_zmq_sndmore => ZMQ_SNDMORE,
/// }
/// ```
///
/// Each entry expands to `pub extern "C" fn blockgate_zmq_noblock() -> c_int`
/// returning the constant. `ACCESSORS` pairs every constant's name with its
/// getter, in declaration order.
macro_rules! constant_accessors {
    ( $( $fn_name:ident => $constant:ident ),+ $(,)? ) => {
        $(
            #[doc = concat!("Value of `", stringify!($constant), "`.")]
            #[unsafe(no_mangle)]
            pub extern "C" fn $fn_name() -> ::std::ffi::c_int {
                $constant
            }
        )+

        /// Every exported getter, keyed by the constant it returns.
        pub const ACCESSORS: &[(&str, extern "C" fn() -> ::std::ffi::c_int)] = &[
            $( (stringify!($constant), $fn_name as extern "C" fn() -> ::std::ffi::c_int), )+
        ];
    };
}

pub(crate) use constant_accessors;
