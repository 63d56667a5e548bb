use actix_web::{
    http::{header::ContentType, StatusCode},
    HttpResponse,
};

#[derive(Debug)]
pub struct ServiceError {
    pub err: anyhow::Error,
    pub code: u16,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ServiceError: {}", self.err)
    }
}

impl actix_web::error::ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        log::error!("{} (code {})", self.err, self.code);
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.err.to_string())
    }
}

// Anything bubbling up from the store or the runtime is a server fault.
impl<E: Into<anyhow::Error>> From<E> for ServiceError {
    fn from(err: E) -> ServiceError {
        ServiceError {
            err: err.into(),
            code: 500,
        }
    }
}

pub trait AddCode {
    fn code(self, code: u16) -> ServiceError;
}

impl AddCode for anyhow::Error {
    fn code(self, code: u16) -> ServiceError {
        ServiceError { err: self, code }
    }
}

impl AddCode for ServiceError {
    fn code(mut self, code: u16) -> ServiceError {
        self.code = code;
        self
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
