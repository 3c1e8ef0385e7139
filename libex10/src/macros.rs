// libex10-rs/libex10/src/macros.rs

/// Declare a `#[repr(u8)]` enum whose variants map one-to-one onto a wire
/// byte, together with `TryFrom<u8>` and `From<Enum> for u8`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl ::std::convert::TryFrom<u8> for $name {
            type Error = $crate::Error;

            fn try_from(value: u8) -> ::std::result::Result<Self, Self::Error> {
                match value {
                    $( v if v == $name::$variant as u8 => Ok($name::$variant), )+
                    other => Err($crate::Error::BadParamValue(format!(
                        concat!("unknown ", stringify!($name), " value {:#04x}"),
                        other
                    ))),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }
    };
}

pub(crate) use wire_enum;
