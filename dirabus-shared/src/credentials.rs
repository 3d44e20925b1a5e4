use crate::pii::Masked;

/// Bearer credential handed explicitly to every call that performs network I/O.
///
/// Obtaining and persisting the token is the caller's business; this type only
/// carries it.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    token: Option<Masked<String>>,
}

impl Credentials {
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(Masked::new(token.into())),
        }
    }

    /// Build from an optional configured token; blank tokens count as anonymous.
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            Some(t) if !t.is_empty() => Self::bearer(t),
            _ => Self::anonymous(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Value for the `Authorization` header, if any.
    pub fn authorization_header(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|t| format!("Bearer {}", t.expose()))
    }
}
