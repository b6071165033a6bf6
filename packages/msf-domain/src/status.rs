use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Lifecycle copy of a document. Every document has a draft copy; published documents also have
/// a published copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
	#[default]
	Draft,
	Published,
}
impl Status {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Draft => "draft",
			Self::Published => "published",
		}
	}

	pub fn is_published(self) -> bool {
		matches!(self, Self::Published)
	}

	pub fn from_published(published: bool) -> Self {
		if published { Self::Published } else { Self::Draft }
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status must be one of draft or published, got {0:?}.")]
pub struct ParseStatusError(pub String);

impl FromStr for Status {
	type Err = ParseStatusError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"draft" => Ok(Self::Draft),
			"published" => Ok(Self::Published),
			_ => Err(ParseStatusError(raw.to_string())),
		}
	}
}
