//! Wire shapes shared by every broker endpoint.

use serde::{Deserialize, Deserializer, Serialize};

/// Fields every broker response may carry next to its resource fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub request_id: String,
    #[serde(default, alias = "StatusMessage", deserialize_with = "nullable")]
    pub status_message: String,
    #[serde(default, deserialize_with = "nullable")]
    pub errors: Vec<String>,
}

impl BaseResponse {
    /// Returns `true` if the body reports a failure: a non-empty error list,
    /// or a status message other than `Success`.
    pub fn request_failed(&self) -> bool {
        !self.errors.is_empty()
            || (!self.status_message.is_empty()
                && !self.status_message.eq_ignore_ascii_case("success"))
    }
}

/// Access to the [`BaseResponse`] embedded in a decoded response.
pub trait Envelope {
    fn base(&self) -> &BaseResponse;
}

impl Envelope for BaseResponse {
    fn base(&self) -> &BaseResponse {
        self
    }
}

/// Implements [`Envelope`] for response structs with a flattened `base` field.
macro_rules! impl_envelope {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::response::Envelope for $ty {
                fn base(&self) -> &$crate::response::BaseResponse {
                    &self.base
                }
            }
        )+
    };
}
pub(crate) use impl_envelope;

/// A resource tag. Tag lists keep their order and may contain duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Treats an explicit JSON `null` like a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
