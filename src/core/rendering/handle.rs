use std::fmt::Display;

/// Handles for driver side resources like programs and shaders.
/// We use concrete integer types so that handles look the same no matter
/// the backend. A value of `0` is never handed out by a backend and marks an
/// unset handle.
macro_rules! driver_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub const INVALID: $name = $name(0);

            #[inline(always)]
            pub fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            #[inline(always)]
            pub fn raw(&self) -> u32 {
                self.0
            }

            #[inline(always)]
            pub fn is_valid(&self) -> bool {
                self.0 != 0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

driver_handle!(
    /// Linked (or linkable) program object
    ProgramHandle
);

driver_handle!(
    /// Compiled shader stage object
    ShaderHandle
);
