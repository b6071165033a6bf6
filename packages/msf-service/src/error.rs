pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	InvalidRequest { message: String, field: Option<String> },
	#[error("Unknown content type: {label}.")]
	UnknownContentType { label: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Malformed settings: {message}")]
	Settings { message: String },
}
impl Error {
	pub fn missing_field(field: &str) -> Self {
		Self::InvalidRequest {
			message: format!("{field} is required."),
			field: Some(field.to_string()),
		}
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<msf_storage::Error> for Error {
	fn from(err: msf_storage::Error) -> Self {
		match err {
			msf_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			msf_storage::Error::InvalidArgument(message) =>
				Self::InvalidRequest { message, field: None },
		}
	}
}
