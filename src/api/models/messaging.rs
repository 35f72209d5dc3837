//! API request models for outbound messaging.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{Error, FieldError};

/// Request to send a WhatsApp text message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    /// Destination phone number; formatting characters are stripped
    #[schema(example = "+55 (11) 91234-5678")]
    pub to: String,
    /// Message body
    pub message: String,
}

impl SendMessageRequest {
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = Vec::new();
        if self.to.trim().is_empty() {
            errors.push(FieldError {
                field: "to".to_string(),
                message: "to is required".to_string(),
            });
        }
        if self.message.trim().is_empty() {
            errors.push(FieldError {
                field: "message".to_string(),
                message: "message is required".to_string(),
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::validation("invalid message", errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_fields_are_required() {
        let request = SendMessageRequest {
            to: " ".to_string(),
            message: "".to_string(),
        };
        let Err(Error::Validation { details, .. }) = request.validate() else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = details.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["to", "message"]);
    }

    #[test]
    fn formatted_numbers_are_accepted() {
        let request = SendMessageRequest {
            to: "+55 (11) 91234-5678".to_string(),
            message: "hello".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}
