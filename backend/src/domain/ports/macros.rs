//! `define_port_error!` declares the error enum of a driven port.
//!
//! Every variant carries named fields and gets a snake_case constructor whose
//! arguments accept anything convertible into the field type, so adapters
//! write `LabRecordsRepositoryError::query(err.to_string())`.

macro_rules! define_port_error {
    (@ctor $variant:ident [$($params:tt)*] [$($inits:tt)*]) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor $variant:ident [$($params:tt)*] [$($inits:tt)*] $field:ident : $ty:ty $(, $($rest:tt)*)?) => {
        define_port_error!(
            @ctor $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($inits)* $field: $field.into(),]
            $($($rest)*)?
        );
    };

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
                $variant { $($field : $ty),+ },
            )+
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant [] [] $($field : $ty),+);
            )+
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        /// Errors of a sample store.
        pub enum StoreError {
            Offline { message: String } => "store offline: {message}",
            Throttled { status: u16, message: String } => "store throttled ({status}): {message}",
        }
    }

    #[rstest]
    fn string_fields_take_str_slices() {
        let err = StoreError::offline("pool exhausted");
        assert_eq!(err.to_string(), "store offline: pool exhausted");
    }

    #[rstest]
    fn constructor_arguments_follow_field_order() {
        let err = StoreError::throttled(429_u16, "slow down");
        assert_eq!(
            err,
            StoreError::Throttled {
                status: 429,
                message: "slow down".to_owned(),
            }
        );
        assert_eq!(err.to_string(), "store throttled (429): slow down");
    }
}
