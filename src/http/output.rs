use bytes::{BufMut, BytesMut};
use std::io;
use std::io::Write;
use strum::{Display, EnumString, IntoStaticStr};

pub const DEFAULT_PROTOCOL: &str = "HTTP/1.1";
pub const PROTOCOL_ENV_VAR: &str = "SERVER_PROTOCOL";

/// The host facility a [`Response`](crate::http::Response) is flushed into.
///
/// Header operations follow the usual host semantics: names compare
/// case-insensitively, `set_header` replaces any earlier header with the same
/// name and `remove_header` drops every header with that name, including
/// ones the host queued before the response was sent.
pub trait HostOutput {
    /// Protocol label of the request being answered, e.g. `HTTP/1.0`.
    fn server_protocol(&self) -> Option<&str> {
        None
    }

    fn status_line(&mut self, line: &str) -> io::Result<()>;

    fn remove_header(&mut self, name: &str) -> io::Result<()>;

    fn set_header(&mut self, name: &str, value: &str) -> io::Result<()>;

    fn write_body(&mut self, body: &[u8]) -> io::Result<()>;

    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn replace_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    drop_header(headers, name);
    headers.push((name.to_string(), value.to_string()));
}

fn drop_header(headers: &mut Vec<(String, String)>, name: &str) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
}

/// Keeps everything in memory so it can be inspected after the response
/// has been sent.
#[derive(Debug, Default, Clone)]
pub struct RecordedOutput {
    protocol: Option<String>,
    status_line: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    finished: usize,
}

impl RecordedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_protocol(protocol: &str) -> Self {
        RecordedOutput {
            protocol: Some(protocol.to_string()),
            ..Self::default()
        }
    }

    /// Headers the host already queued before the response is sent.
    pub fn with_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (k, v) in headers {
            replace_header(&mut self.headers, k.as_ref(), v.as_ref());
        }
        self
    }

    pub fn status(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// How many response cycles have been completed.
    pub fn finished(&self) -> usize {
        self.finished
    }
}

impl HostOutput for RecordedOutput {
    fn server_protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    fn status_line(&mut self, line: &str) -> io::Result<()> {
        self.status_line = Some(line.to_string());
        Ok(())
    }

    fn remove_header(&mut self, name: &str) -> io::Result<()> {
        drop_header(&mut self.headers, name);
        Ok(())
    }

    fn set_header(&mut self, name: &str, value: &str) -> io::Result<()> {
        replace_header(&mut self.headers, name, value);
        Ok(())
    }

    fn write_body(&mut self, body: &[u8]) -> io::Result<()> {
        self.body.extend_from_slice(body);
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.finished += 1;
        Ok(())
    }
}

/// How a [`StreamOutput`] frames the status of the response.
#[derive(EnumString, IntoStaticStr, Debug, PartialEq, Eq, Clone, Copy, Display, Default)]
pub enum Framing {
    /// Raw HTTP/1.x status line, as non-parsed-header scripts write it.
    #[default]
    #[strum(serialize = "nph")]
    Nph,
    /// `Status: <code> <phrase>` header, as CGI hosts expect (RFC 3875 6.3.3).
    #[strum(serialize = "cgi")]
    Cgi,
}

/// Serializes the response as an HTTP/1.x message into any writer once the
/// cycle is finished.
pub struct StreamOutput<W: Write> {
    writer: W,
    framing: Framing,
    protocol: Option<String>,
    status_line: Option<String>,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl<W: Write> StreamOutput<W> {
    pub fn new(writer: W) -> Self {
        StreamOutput {
            writer,
            framing: Framing::default(),
            protocol: None,
            status_line: None,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_protocol(writer: W, protocol: &str) -> Self {
        let mut out = Self::new(writer);
        out.protocol = Some(protocol.to_string());
        out
    }

    /// Takes the protocol label from `SERVER_PROTOCOL`, as set by CGI hosts.
    pub fn from_env(writer: W) -> Self {
        let mut out = Self::new(writer);
        out.protocol = std::env::var(PROTOCOL_ENV_VAR)
            .ok()
            .filter(|p| !p.trim().is_empty());
        out
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn serialize(&self) -> BytesMut {
        let content_len = self.body.as_ref().map(|c| c.len()).unwrap_or(0);
        let mut resp_bytes = BytesMut::with_capacity(content_len + self.headers.len() * 32 + 32);

        let status_line = self
            .status_line
            .clone()
            .unwrap_or_else(|| format!("{} 200 OK", DEFAULT_PROTOCOL));
        match self.framing {
            Framing::Nph => resp_bytes.put(format!("{}\r\n", status_line).as_bytes()),
            Framing::Cgi => {
                // Drop the protocol label, CGI hosts supply their own.
                let status = status_line
                    .split_once(' ')
                    .map(|(_, rest)| rest)
                    .unwrap_or(status_line.as_str());
                resp_bytes.put(format!("Status: {}\r\n", status).as_bytes());
            }
        }

        for (key, value) in &self.headers {
            if self.body.is_some() && key.eq_ignore_ascii_case("Content-Length") {
                continue;
            }
            if self.framing == Framing::Cgi && key.eq_ignore_ascii_case("Status") {
                continue;
            }
            resp_bytes.put(format!("{}: {}\r\n", key, value).as_bytes());
        }

        if let Some(c) = &self.body {
            resp_bytes.put(format!("Content-Length: {}\r\n", c.len()).as_bytes());
            resp_bytes.put(&b"\r\n"[..]);
            resp_bytes.put(c.as_slice());
        } else {
            resp_bytes.put(&b"\r\n"[..]);
        }

        resp_bytes
    }
}

impl<W: Write> HostOutput for StreamOutput<W> {
    fn server_protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    fn status_line(&mut self, line: &str) -> io::Result<()> {
        self.status_line = Some(line.to_string());
        Ok(())
    }

    fn remove_header(&mut self, name: &str) -> io::Result<()> {
        drop_header(&mut self.headers, name);
        Ok(())
    }

    fn set_header(&mut self, name: &str, value: &str) -> io::Result<()> {
        replace_header(&mut self.headers, name, value);
        Ok(())
    }

    fn write_body(&mut self, body: &[u8]) -> io::Result<()> {
        self.body.get_or_insert_with(Vec::new).extend_from_slice(body);
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        let bytes = self.serialize();
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;

        self.status_line = None;
        self.headers.clear();
        self.body = None;
        Ok(())
    }
}
