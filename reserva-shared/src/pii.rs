use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wrapper for sensitive values (emails, phone numbers) that redacts them in
/// Debug/Display so log macros cannot leak them, while still serializing the
/// real value into API responses.
#[derive(Clone, Deserialize)]
pub struct Masked<T>(pub T);

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn as_inner(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<redacted>")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<redacted>")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_but_serde_keeps_value() {
        let email = Masked::new("customer@example.com".to_string());
        assert_eq!(format!("{:?}", email), "<redacted>");
        assert_eq!(
            serde_json::to_string(&email).unwrap(),
            "\"customer@example.com\""
        );
    }
}
