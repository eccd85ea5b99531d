/// A macro to generate a common set of derives for a struct.
/// especially Clone, Debug, PartialEq, Serialize, Deserialize
#[macro_export]
macro_rules! common_struct {
    (
        no_debug
        $(#[$attr:meta])*
        pub struct $name:ident { $($t:tt)* }
    ) => {
        #[derive(Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        $(#[$attr])*
        pub struct $name {
            $($t)*
        }
    };
    (
        $(#[$attr:meta])*
        pub struct $name:ident { $($t:tt)* }
    ) => {
        $crate::common_struct!(
            no_debug
            $(#[$attr])*
            #[derive(Debug)]
            pub struct $name { $($t)* }
        );
    };
}

/// Same derives as [`common_struct!`], for enums.
#[macro_export]
macro_rules! common_enum {
    (
        $(#[$attr:meta])*
        pub enum $name:ident { $($t:tt)* }
    ) => {
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        $(#[$attr])*
        pub enum $name {
            $($t)*
        }
    };
}

/// Macro to return early with a validation error
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::error::Error::Validation(format!($($arg)*)))
    };
}
