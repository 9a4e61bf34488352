//! Helper macro for port error enums.
//!
//! Every variant carries named fields; the macro derives `thiserror::Error`
//! and emits one snake_case constructor per variant whose parameters accept
//! `impl Into<FieldType>`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),+ },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Construct [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                }
            )+
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SamplePortError {
            Unreachable { message: String } => "unreachable: {message}",
            Throttled { retry_after_secs: u64 } => "throttled for {retry_after_secs}s",
            Rejected { status: u16, message: String } => "rejected ({status}): {message}",
        }
    }

    #[test]
    fn constructors_accept_borrowed_strings() {
        let err = SamplePortError::unreachable("dns");
        assert_eq!(err.to_string(), "unreachable: dns");
    }

    #[test]
    fn constructors_keep_numeric_fields() {
        let err = SamplePortError::throttled(30_u64);
        assert_eq!(err, SamplePortError::Throttled { retry_after_secs: 30 });
    }

    #[test]
    fn constructors_take_fields_in_declaration_order() {
        let err = SamplePortError::rejected(409_u16, "exists");
        assert_eq!(err.to_string(), "rejected (409): exists");
    }
}
