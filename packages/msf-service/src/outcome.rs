use std::fmt::Display;

/// Result of an operation whose failures are reported in-band.
///
/// Callers of the selection and listing endpoints render zero options instead of an error page,
/// so a failure still carries a well-formed empty payload next to the message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
	Ok(T),
	SoftFail { empty: T, message: String },
}
impl<T> Outcome<T> {
	pub fn is_soft_fail(&self) -> bool {
		matches!(self, Self::SoftFail { .. })
	}

	pub fn error_message(&self) -> Option<&str> {
		match self {
			Self::Ok(_) => None,
			Self::SoftFail { message, .. } => Some(message),
		}
	}

	pub fn data(&self) -> &T {
		match self {
			Self::Ok(data) | Self::SoftFail { empty: data, .. } => data,
		}
	}

	pub fn into_parts(self) -> (T, Option<String>) {
		match self {
			Self::Ok(data) => (data, None),
			Self::SoftFail { empty, message } => (empty, Some(message)),
		}
	}
}
impl<T> Outcome<T>
where
	T: Default,
{
	pub fn soft_fail(message: impl Into<String>) -> Self {
		Self::SoftFail { empty: T::default(), message: message.into() }
	}

	pub fn from_result<E>(result: Result<T, E>) -> Self
	where
		E: Display,
	{
		match result {
			Ok(data) => Self::Ok(data),
			Err(err) => Self::soft_fail(err.to_string()),
		}
	}
}
