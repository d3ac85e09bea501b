//! Macro for implementing Display and FromStr for vendor vocabulary enums
//!
//! The Marketing Cloud API spells its enumerations in camelCase
//! (`greaterThan`, `OpenEvent`, ...). This macro maps each variant to its wire
//! spelling once, so the string matching lives in a single place.
//!
//! # Example
//!
//! ```rust
//! use mcreport_domain::impl_vendor_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum SortOrder {
//!     Ascending,
//!     Descending,
//! }
//!
//! impl_vendor_enum_conversions!(SortOrder {
//!     Ascending => "ASC",
//!     Descending => "DESC",
//! });
//!
//! assert_eq!(SortOrder::Ascending.to_string(), "ASC");
//! assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Descending);
//! ```

/// Implements Display and FromStr traits for vendor enums
///
/// This macro generates:
/// - Display trait: writes the exact wire spelling
/// - FromStr trait: parses case-insensitively back to the variant
#[macro_export]
macro_rules! impl_vendor_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire spelling used by the Marketing Cloud API.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
