//! Strongly typed identifiers embedded in resource paths.

// std
use std::{borrow::Borrow, ops::Deref, str::FromStr};
// self
use crate::{_prelude::*, request::Param};

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl From<&$name> for Param {
			fn from(value: &$name) -> Self {
				Param::Text(value.0.clone())
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 256;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (account, message, file, source, token, provider).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (account, message, file, source, token, provider).
		kind: &'static str,
	},
	/// The identifier contains a path separator.
	#[error("{kind} identifier contains a path separator.")]
	ContainsSeparator {
		/// Kind of identifier (account, message, file, source, token, provider).
		kind: &'static str,
	},
	/// The identifier is a `.` or `..` path segment.
	#[error("{kind} identifier cannot be a dot segment.")]
	DotSegment {
		/// Kind of identifier (account, message, file, source, token, provider).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (account, message, file, source, token, provider).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { AccountId, "Hexadecimal identifier of an account.", "Account" }
def_id! { MessageId, "Context.IO identifier of a message.", "Message" }
def_id! { FileId, "Context.IO identifier of a file attachment.", "File" }
def_id! { SourceLabel, "Label of a mail source, e.g. `me@example.com::imap`.", "Source" }
def_id! { TokenId, "Identifier of a connect token.", "Token" }
def_id! { ProviderKey, "Consumer key identifying an OAuth provider.", "Provider" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.contains(['/', '?', '#']) {
		return Err(IdentifierError::ContainsSeparator { kind });
	}
	if matches!(view, "." | "..") {
		return Err(IdentifierError::DotSegment { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_validate() {
		assert!(AccountId::new(" abc").is_err(), "Leading whitespace must be rejected.");
		assert!(AccountId::new("abc ").is_err(), "Trailing whitespace must be rejected.");
		assert!(MessageId::new("").is_err());
		assert!(FileId::new("a/b").is_err());
		assert_eq!(
			AccountId::new(".."),
			Err(IdentifierError::DotSegment { kind: "Account" }),
			"Parent segments would escape the resource path."
		);
		assert_eq!(SourceLabel::new("."), Err(IdentifierError::DotSegment { kind: "Source" }));
		assert!(MessageId::new("..m1").is_ok(), "Dots inside an identifier are allowed.");

		let label = SourceLabel::new("me@example.com::imap.example.com")
			.expect("Source labels with separators should be valid.");

		assert_eq!(label.as_ref(), "me@example.com::imap.example.com");
		assert_eq!(format!("{label:?}"), "Source(me@example.com::imap.example.com)");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let id: AccountId =
			serde_json::from_str("\"4f01234567890abcdef09876\"").expect("Account id should decode.");

		assert_eq!(id.to_string(), "4f01234567890abcdef09876");
		assert_eq!(
			serde_json::to_string(&id).expect("Account id should encode."),
			"\"4f01234567890abcdef09876\""
		);
		assert!(serde_json::from_str::<AccountId>("\"with space\"").is_err());
		assert!(serde_json::from_str::<TokenId>("\"\"").is_err());
	}

	#[test]
	fn length_limit_applies() {
		let long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert_eq!(
			ProviderKey::new(&long),
			Err(IdentifierError::TooLong { kind: "Provider", max: IDENTIFIER_MAX_LEN })
		);
		assert!(ProviderKey::new(&long[..IDENTIFIER_MAX_LEN]).is_ok());
	}
}
