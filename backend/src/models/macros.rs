/// Defines an identifier newtype.
///
/// Integer identifiers (`define_id_type!(i64, AreaId)`) are `Copy`, expose
/// `new`/`value` and convert to and from the scalar. String keys
/// (`define_id_type!(String, TenantId)`) expose `new(impl Into<String>)` and
/// `as_str`, and convert from `&str` and `String`.
///
/// Both forms serialize transparently, so they can be used as JSON map keys,
/// and display as the bare inner value.
#[macro_export]
macro_rules! define_id_type {
    (@display $name:ident) => {
        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }
    };

    (String, $name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        $crate::define_id_type!(@display $name);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                $name(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::std::convert::From<&str> for $name {
            fn from(value: &str) -> Self {
                $name(value.to_string())
            }
        }

        impl ::std::convert::From<String> for $name {
            fn from(value: String) -> Self {
                $name(value)
            }
        }
    };

    ($inner:ty, $name:ident) => {
        #[derive(
            Debug,
            Copy,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        $crate::define_id_type!(@display $name);

        impl $name {
            pub fn new(value: $inner) -> Self {
                $name(value)
            }

            pub fn value(&self) -> $inner {
                self.0
            }
        }

        impl ::std::convert::From<$inner> for $name {
            fn from(value: $inner) -> Self {
                $name(value)
            }
        }

        impl ::std::convert::From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}
