use rocket::{Request, catch, serde::json::Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorMessage {
    error: String,
    status: u16,
}

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ErrorMessage> {
    Json(ErrorMessage {
        error: "Malformed request.".into(),
        status: 400
    })
}

#[catch(401)]
pub fn unauthorized(_req: &Request) -> Json<ErrorMessage> {
    Json(ErrorMessage {
        error: "Missing or invalid secret token.".into(),
        status: 401
    })
}

#[catch(404)]
pub fn not_found(_req: &Request) -> Json<ErrorMessage> {
    Json(ErrorMessage {
        error: "The requested resource was not found.".into(),
        status: 404
    })
}

#[catch(422)]
pub fn unprocessable(req: &Request) -> Json<ErrorMessage> {
    let error_msg = match req.uri().path().segments().next() {
        Some("telegram") => "Update payload could not be parsed.",
        _ => "Request body could not be parsed."
    };

    Json(ErrorMessage {
        error: error_msg.into(),
        status: 422
    })
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ErrorMessage> {
    Json(ErrorMessage {
        error: "An internal server error occurred.".into(),
        status: 500
    })
}
