use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use mesrs_core::AppError;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

fn collect_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() || *field == "__all__" {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| {
                            if path == "__all__" {
                                error.code.to_string()
                            } else {
                                format!("{} is invalid", path)
                            }
                        });
                    out.push(message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_errors(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_errors(&format!("{path}[{index}]"), nested, out);
                }
            }
        }
    }
}

fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_errors("", errors, &mut messages);
    messages.sort();
    messages.join(", ")
}

/// JSON body extractor that runs `validator` rules; failures are 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let error_msg = rejection.body_text();

                if error_msg.contains("missing field") {
                    let field = error_msg
                        .split("missing field `")
                        .nth(1)
                        .and_then(|s| s.split('`').next())
                        .unwrap_or("unknown");
                    return AppError::new(
                        StatusCode::BAD_REQUEST,
                        anyhow!("{} is required", field),
                    );
                }

                if error_msg.contains("unknown variant") || error_msg.contains("invalid type") {
                    return AppError::new(
                        StatusCode::BAD_REQUEST,
                        anyhow!("Invalid field type in request"),
                    );
                }

                if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
                    return AppError::new(
                        StatusCode::BAD_REQUEST,
                        anyhow!("Missing 'Content-Type: application/json' header"),
                    );
                }

                AppError::new(StatusCode::BAD_REQUEST, anyhow!("Invalid request body"))
            })?;

        value.validate().map_err(|errors| {
            AppError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                anyhow!("{}", format_errors(&errors)),
            )
        })?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesrs_models::academic_years::CreateAcademicYearDto;
    use mesrs_models::profiles::{AdminUpdateProfileDto, UpdateProfileDto};

    #[test]
    fn nested_errors_are_prefixed() {
        let dto = AdminUpdateProfileDto {
            profile: UpdateProfileDto {
                first_name: Some(String::new()),
                ..Default::default()
            },
            ..Default::default()
        };
        let errors = dto.validate().unwrap_err();
        assert_eq!(format_errors(&errors), "profile.first_name is invalid");
    }

    #[test]
    fn schema_errors_use_their_code() {
        let dto: CreateAcademicYearDto = serde_json::from_str(
            r#"{"name": "2025-2026", "start_date": "2026-07-01", "end_date": "2025-09-01"}"#,
        )
        .unwrap();
        let errors = dto.validate().unwrap_err();
        assert_eq!(format_errors(&errors), "end_date_before_start_date");
    }
}
