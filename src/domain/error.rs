use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("required fields are empty: {}", fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },
}

impl DomainError {
    pub fn missing(fields: Vec<&'static str>) -> Self {
        Self::MissingFields { fields }
    }

    /// Field names reported as missing.
    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            Self::MissingFields { fields } => fields,
        }
    }
}
