//! Helper macro for declaring port error enums.
//!
//! Each variant gets a snake_case constructor whose parameters accept
//! `impl Into<FieldType>`, so adapters can write
//! `RideRepositoryError::query("boom")` instead of building the struct variant.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build a [`Self::", stringify!($variant), "`] error.")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            #[doc = concat!("Build a [`Self::", stringify!($variant), "`] error.")]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum SeatLedgerError {
            Unavailable => "seat ledger unavailable",
            Rejected { reason: String } => "seat rejected: {reason}",
            Stale { expected: u32, actual: u32 } => "stale ledger: expected {expected}, got {actual}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(SeatLedgerError::unavailable(), SeatLedgerError::Unavailable);
        assert_eq!(
            SeatLedgerError::unavailable().to_string(),
            "seat ledger unavailable"
        );
    }

    #[test]
    fn string_fields_accept_borrowed_input() {
        let err = SeatLedgerError::rejected("ride full");
        assert_eq!(err.to_string(), "seat rejected: ride full");
    }

    #[test]
    fn numeric_fields_keep_their_types() {
        let err = SeatLedgerError::stale(2_u32, 5_u32);
        assert_eq!(
            err,
            SeatLedgerError::Stale {
                expected: 2,
                actual: 5
            }
        );
        assert_eq!(err.to_string(), "stale ledger: expected 2, got 5");
    }
}
