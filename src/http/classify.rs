use crate::http::response::StatusCode;

/// Derives the response status for a well-formed request.
///
/// The checks run in a fixed order and the first failure wins: method, then
/// resource type, then existence. A request for `/missing.exe` with `POST` is
/// therefore 405, not 403 or 404.
pub fn classify(valid_method: bool, valid_resource: bool, exists: bool) -> StatusCode {
    if !valid_method {
        StatusCode::MethodNotAllowed
    } else if !valid_resource {
        StatusCode::Forbidden
    } else if !exists {
        StatusCode::NotFound
    } else {
        StatusCode::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_checked_first() {
        for valid_resource in [true, false] {
            for exists in [true, false] {
                assert_eq!(
                    classify(false, valid_resource, exists),
                    StatusCode::MethodNotAllowed
                );
            }
        }
    }

    #[test]
    fn resource_type_checked_before_existence() {
        assert_eq!(classify(true, false, false), StatusCode::Forbidden);
        assert_eq!(classify(true, false, true), StatusCode::Forbidden);
    }

    #[test]
    fn missing_and_found() {
        assert_eq!(classify(true, true, false), StatusCode::NotFound);
        assert_eq!(classify(true, true, true), StatusCode::Ok);
    }
}
