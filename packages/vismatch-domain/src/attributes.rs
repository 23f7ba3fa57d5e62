use serde::{Deserialize, Serialize};

use crate::text;

/// Product description produced by the vision model for one capture.
///
/// Every field is optional and a missing field means "no signal", never "no match".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedAttributes {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub brand: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub code: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	#[serde(default)]
	pub hints: Vec<String>,
}
impl DetectedAttributes {
	pub fn name(&self) -> Option<&str> {
		text::signal(self.name.as_deref())
	}

	pub fn brand(&self) -> Option<&str> {
		text::signal(self.brand.as_deref())
	}

	pub fn code(&self) -> Option<&str> {
		text::signal(self.code.as_deref())
	}

	pub fn size(&self) -> Option<&str> {
		text::signal(self.size.as_deref())
	}

	pub fn color(&self) -> Option<&str> {
		text::signal(self.color.as_deref())
	}

	/// Non-blank hints, trimmed, in their given order.
	pub fn hints(&self) -> impl Iterator<Item = &str> {
		self.hints.iter().map(|hint| hint.trim()).filter(|hint| !hint.is_empty())
	}

	pub fn is_empty(&self) -> bool {
		self.name().is_none()
			&& self.brand().is_none()
			&& self.code().is_none()
			&& self.size().is_none()
			&& self.color().is_none()
			&& self.hints().next().is_none()
	}

	/// Trims every value and turns blank ones into `None` (or drops them from `hints`).
	pub fn normalized(&self) -> Self {
		let owned = |value: Option<&str>| value.map(str::to_string);

		Self {
			name: owned(self.name()),
			brand: owned(self.brand()),
			code: owned(self.code()),
			size: owned(self.size()),
			color: owned(self.color()),
			hints: self.hints().map(str::to_string).collect(),
		}
	}
}
