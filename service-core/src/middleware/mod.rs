pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, RequestId, http_request_span, request_id_middleware};
