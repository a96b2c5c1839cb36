//! Wire messages and framing.
//!
//! Every message is a 4-byte big-endian length prefix followed by a JSON
//! payload. Requests are tagged by `op`; responses carry `ok`, `data` and an
//! optional `error`.

use bytes::{BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::error::{Error, Result};

/// Maximum payload size (4 MB).
pub const MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

pub const LENGTH_PREFIX_SIZE: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Auth {
        user: String,
        password: String,
    },
    Insert {
        database: String,
        collection: String,
        document: Value,
    },
    Find {
        database: String,
        collection: String,
        filters: Vec<Value>,
        fields: Vec<String>,
        sort: Map<String, Value>,
        skip: u64,
        limit: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn success(data: Value) -> Self {
        Self {
            ok: true,
            data,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: Value::Null,
            error: Some(message.into()),
        }
    }

    pub fn into_result(self) -> Result<Value> {
        if self.ok {
            Ok(self.data)
        } else {
            Err(Error::Server(
                self.error.unwrap_or_else(|| "unspecified error".to_string()),
            ))
        }
    }
}

/// Serialize `message` into a length-prefixed frame.
pub fn encode_frame<T: Serialize>(message: &T) -> Result<Bytes> {
    let payload = serde_json::to_vec(message)?;
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(Error::Protocol(format!(
            "payload size {} exceeds maximum {}",
            payload.len(),
            MAX_MESSAGE_SIZE
        )));
    }

    let mut frame = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    frame.put_u32(payload.len() as u32);
    frame.put_slice(&payload);
    Ok(frame.freeze())
}

pub fn decode_frame_length(header: [u8; LENGTH_PREFIX_SIZE]) -> Result<usize> {
    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(Error::Protocol(format!(
            "frame length {} exceeds maximum {}",
            len, MAX_MESSAGE_SIZE
        )));
    }
    Ok(len)
}

pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let frame = encode_frame(message)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_message<R, T>(reader: &mut R) -> Result<T>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut header = [0u8; LENGTH_PREFIX_SIZE];
    reader.read_exact(&mut header).await?;
    let len = decode_frame_length(header)?;

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(serde_json::from_slice(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_are_tagged_by_op() {
        let request = Request::Auth {
            user: "admin".to_string(),
            password: "admin".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"op": "auth", "user": "admin", "password": "admin"})
        );
    }

    #[test]
    fn frame_has_big_endian_length_prefix() {
        let frame = encode_frame(&json!({"a": 1})).unwrap();
        let payload = br#"{"a":1}"#;
        assert_eq!(&frame[..LENGTH_PREFIX_SIZE], &(payload.len() as u32).to_be_bytes());
        assert_eq!(&frame[LENGTH_PREFIX_SIZE..], payload);
    }

    #[test]
    fn oversized_frame_length_is_rejected() {
        let header = ((MAX_MESSAGE_SIZE + 1) as u32).to_be_bytes();
        assert!(matches!(decode_frame_length(header), Err(Error::Protocol(_))));
    }

    #[test]
    fn failed_response_becomes_server_error() {
        let err = Response::failure("bad credentials").into_result().unwrap_err();
        assert!(matches!(err, Error::Server(message) if message == "bad credentials"));

        let missing: Response = serde_json::from_str(r#"{"ok": false}"#).unwrap();
        assert!(matches!(missing.into_result(), Err(Error::Server(_))));
    }

    #[tokio::test]
    async fn messages_survive_a_duplex_stream() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        let request = Request::Find {
            database: "user".to_string(),
            collection: "user".to_string(),
            filters: vec![json!({"name": "Diana"})],
            fields: vec![],
            sort: Map::from_iter([("_id".to_string(), json!(-1))]),
            skip: 100,
            limit: 10,
        };

        write_message(&mut client, &request).await.unwrap();
        let received: Request = read_message(&mut server).await.unwrap();
        assert_eq!(received, request);
    }
}
