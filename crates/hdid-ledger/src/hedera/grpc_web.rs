//! Unary gRPC-web calls over HTTP/1.1.
//!
//! Each message is framed as a flag byte, a big-endian `u32` length and the
//! protobuf payload. The response carries one data frame followed by a
//! trailer frame (flag `0x80`) holding `grpc-status` and `grpc-message`.

use prost::Message;
use reqwest::header::CONTENT_TYPE;

use crate::error::TransportError;

const CONTENT_TYPE_PROTO: &str = "application/grpc-web+proto";
const TRAILER_FLAG: u8 = 0x80;
const USER_AGENT: &str = concat!("hdid/", env!("CARGO_PKG_VERSION"));

/// Frame a protobuf payload as one gRPC-web data message.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 5);
    out.push(0);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

fn check_status(status: Option<&str>, message: Option<&str>) -> Result<(), TransportError> {
    match status.map(str::trim) {
        None | Some("0") => Ok(()),
        Some(code) => Err(TransportError::Network(format!(
            "gRPC status {}: {}",
            code,
            message.unwrap_or("").trim()
        ))),
    }
}

fn parse_trailers(block: &[u8]) -> Result<(), TransportError> {
    let text = String::from_utf8_lossy(block);
    let mut status = None;
    let mut message = None;
    for line in text.split("\r\n") {
        if let Some((key, value)) = line.split_once(':') {
            match key.trim().to_ascii_lowercase().as_str() {
                "grpc-status" => status = Some(value.to_string()),
                "grpc-message" => message = Some(value.to_string()),
                _ => {}
            }
        }
    }
    check_status(status.as_deref(), message.as_deref())
}

/// Split a gRPC-web response body into its data payload, checking trailers.
pub fn unframe(body: &[u8]) -> Result<Vec<u8>, TransportError> {
    let mut data = None;
    let mut rest = body;

    while !rest.is_empty() {
        if rest.len() < 5 {
            return Err(TransportError::Malformed("truncated gRPC-web frame header".into()));
        }
        let flag = rest[0];
        let len = u32::from_be_bytes([rest[1], rest[2], rest[3], rest[4]]) as usize;
        let payload = rest
            .get(5..5 + len)
            .ok_or_else(|| TransportError::Malformed("truncated gRPC-web frame".into()))?;
        if flag & TRAILER_FLAG != 0 {
            parse_trailers(payload)?;
        } else if data.is_none() {
            data = Some(payload.to_vec());
        }
        rest = &rest[5 + len..];
    }

    data.ok_or_else(|| TransportError::Malformed("gRPC-web response without a message".into()))
}

/// Client for one gRPC-web endpoint.
#[derive(Debug, Clone)]
pub struct GrpcWebClient {
    http: reqwest::Client,
    base_url: String,
}

impl GrpcWebClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Call `path` (e.g. `/proto.CryptoService/getTransactionReceipts`).
    pub async fn unary<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp, TransportError>
    where
        Req: Message,
        Resp: Message + Default,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::trace!(url = %url, "gRPC-web request");

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, CONTENT_TYPE_PROTO)
            .header("x-grpc-web", "1")
            .header("x-user-agent", USER_AGENT)
            .body(frame(&request.encode_to_vec()))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Network(format!("{} returned HTTP {}", url, status)));
        }

        // Trailers-only responses report the status in the HTTP headers.
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        check_status(header("grpc-status").as_deref(), header("grpc-message").as_deref())?;

        let body = response.bytes().await?;
        let payload = unframe(&body)?;
        Ok(Resp::decode(payload.as_slice())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trailer(text: &str) -> Vec<u8> {
        let mut out = vec![TRAILER_FLAG];
        out.extend_from_slice(&(text.len() as u32).to_be_bytes());
        out.extend_from_slice(text.as_bytes());
        out
    }

    #[test]
    fn test_frame_header() {
        assert_eq!(frame(&[1, 2, 3]), vec![0, 0, 0, 0, 3, 1, 2, 3]);
    }

    #[test]
    fn test_unframe_data_and_ok_trailer() {
        let mut body = frame(&[9, 8]);
        body.extend(trailer("grpc-status:0\r\ngrpc-message:\r\n"));
        assert_eq!(unframe(&body).unwrap(), vec![9, 8]);
    }

    #[test]
    fn test_unframe_error_trailer() {
        let mut body = frame(&[]);
        body.extend(trailer("grpc-status:14\r\ngrpc-message:unavailable\r\n"));
        let err = unframe(&body).unwrap_err();
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn test_unframe_truncated() {
        assert!(matches!(
            unframe(&[0, 0, 0, 0, 9, 1]),
            Err(TransportError::Malformed(_))
        ));
        assert!(matches!(unframe(&[0, 0]), Err(TransportError::Malformed(_))));
    }

    #[test]
    fn test_unframe_trailer_only_is_malformed() {
        let body = trailer("grpc-status:0\r\n");
        assert!(matches!(unframe(&body), Err(TransportError::Malformed(_))));
    }
}
