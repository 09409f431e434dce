//! `define_port_error!`: declares a port error enum and its constructors.
//!
//! Variants are written `Name { field: Type, .. } => "display message"` or
//! `Name => "display message"`. Each one gets a `thiserror` message and a
//! snake_case constructor taking `impl Into<Type>` per field.

macro_rules! define_port_error {
    (@constructor $variant:ident) => {
        ::paste::paste! {
            #[doc = "Construct the `" $variant "` variant."]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),+ }) => {
        ::paste::paste! {
            #[doc = "Construct the `" $variant "` variant."]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                Self::$variant {
                    $($field: $field.into()),+
                }
            }
        }
    };

    (
        $(#[$enum_meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),+ $(,)? } )? => $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field: $ty),+ } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),+ } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        pub enum SampleStoreError {
            Offline { message: String } => "store offline: {message}",
            Duplicate { field: String, attempts: u8 } => "duplicate {field} after {attempts} attempts",
            Missing => "record missing",
        }
    }

    #[rstest]
    fn string_fields_accept_str() {
        let err = SampleStoreError::offline("refused");
        assert_eq!(err.to_string(), "store offline: refused");
    }

    #[rstest]
    fn mixed_fields_keep_their_types() {
        let err = SampleStoreError::duplicate("email", 3_u8);
        assert_eq!(
            err,
            SampleStoreError::Duplicate {
                field: "email".to_owned(),
                attempts: 3
            }
        );
        assert_eq!(err.to_string(), "duplicate email after 3 attempts");
    }

    #[rstest]
    fn unit_variants_get_constructors() {
        assert_eq!(SampleStoreError::missing(), SampleStoreError::Missing);
        assert_eq!(SampleStoreError::missing().to_string(), "record missing");
    }
}
