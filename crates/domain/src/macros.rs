//! Macro for implementing name conversions on identifier enums
//!
//! Metric identifiers, backend selectors and similar closed enums all need the
//! same three things: a stable `&'static str`, `Display`, and case-insensitive
//! `FromStr`. This macro generates all three from a single variant table so
//! the string never drifts between them.
//!
//! # Example
//!
//! ```rust
//! use driverscope_domain::impl_domain_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Consistency {
//!     One,
//!     Quorum,
//!     All,
//! }
//!
//! impl_domain_name_conversions!(Consistency {
//!     One => "one",
//!     Quorum => "quorum",
//!     All => "all",
//! });
//!
//! assert_eq!(Consistency::Quorum.as_str(), "quorum");
//! assert_eq!("ALL".parse::<Consistency>(), Ok(Consistency::All));
//! ```

/// Implements `as_str`, `Display` and `FromStr` for identifier enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations
///
/// Parsing is case-insensitive; output always uses the mapped string.
#[macro_export]
macro_rules! impl_domain_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Stable string form of this identifier
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
