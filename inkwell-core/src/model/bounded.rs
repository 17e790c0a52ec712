//! Newtypes for the length-limited strings of the model.

/// Declares a validated string newtype and its error type.
///
/// Values must be non-blank, at most `max_len` characters long and, when an
/// `allowed` predicate is given, consist only of characters it accepts.
/// Deserialization applies the same checks as `new`.
macro_rules! bounded_string {
    (@allowed) => {
        |_| true
    };
    (@allowed $allowed:expr) => {
        $allowed
    };
    ($(#[$meta:meta])* $name:ident, $error:ident, $label:literal, max_len = $max_len:expr
        $(, allowed = $allowed:expr)?) => {
        $(#[$meta])*
        #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, ::thiserror::Error)]
        #[error("Invalid {label}: {0:?}", label = $label)]
        pub struct $error(String);

        impl $name {
            pub const MAX_LEN: usize = $max_len;

            pub fn new(value: String) -> Result<Self, $error> {
                let allowed: fn(char) -> bool = $crate::model::bounded::bounded_string!(@allowed $($allowed)?);

                if value.trim().is_empty()
                    || value.chars().count() > Self::MAX_LEN
                    || !value.chars().all(allowed)
                {
                    return Err($error(value));
                }

                Ok(Self(value))
            }

            #[must_use]
            pub fn get(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $error;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = $error;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value.to_owned())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let inner = <String as ::serde::Deserialize<'de>>::deserialize(deserializer)?;
                Self::new(inner).map_err(|err| {
                    ::serde::de::Error::invalid_value(
                        ::serde::de::Unexpected::Str(&err.0),
                        &stringify!($name),
                    )
                })
            }
        }
    };
}

pub(crate) use bounded_string;
