//! Display/FromStr for lowercase state enums
//!
//! ```rust
//! use mailsweep_domain::impl_state_strings;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Phase {
//!     Listing,
//!     Trashing,
//! }
//!
//! impl_state_strings!(Phase {
//!     Listing => "listing",
//!     Trashing => "trashing",
//! });
//!
//! assert_eq!(Phase::Trashing.to_string(), "trashing");
//! assert_eq!("LISTING".parse::<Phase>(), Ok(Phase::Listing));
//! ```

/// Implements `Display` (the given string) and case-insensitive `FromStr`
/// for a fieldless enum. Parse errors name the enum and the rejected input.
#[macro_export]
macro_rules! impl_state_strings {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(match self {
                    $(Self::$variant => $str,)+
                })
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $(
                    if wanted.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("unknown {} '{}'", stringify!($enum_name), s))
            }
        }
    };
}
