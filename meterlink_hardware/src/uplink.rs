//! Metric upload over a raw HTTP/1.1 POST.
//!
//! The endpoint speaks the ThingSpeak update protocol: a form-urlencoded
//! body of positional `field1..fieldN` values and the write key in an
//! `X-THINGSPEAKAPIKEY` header. The response body is ignored; a completed
//! exchange counts as delivered.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use meterlink_traits::{HwResult, MetricField, Uplink};

use crate::error::HwError;

pub struct HttpUplink {
    host: String,
    port: u16,
    path: String,
    write_key: String,
    io_timeout: Duration,
}

impl HttpUplink {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        path: impl Into<String>,
        write_key: impl Into<String>,
        io_timeout: Duration,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
            write_key: write_key.into(),
            io_timeout,
        }
    }

    /// Positional form body: the n-th metric becomes `field{n+1}`.
    fn body(fields: &[MetricField]) -> String {
        let mut body = String::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                body.push('&');
            }
            body.push_str(&format!("field{}={}", i + 1, field.value));
        }
        body
    }

    fn request(&self, body: &str) -> String {
        format!(
            "POST {path} HTTP/1.1\r\n\
             Host: {host}\r\n\
             Connection: close\r\n\
             X-THINGSPEAKAPIKEY: {key}\r\n\
             Content-Type: application/x-www-form-urlencoded\r\n\
             Content-Length: {len}\r\n\
             \r\n\
             {body}",
            path = self.path,
            host = self.host,
            key = self.write_key,
            len = body.len(),
        )
    }

    fn exchange(&self, request: &str) -> Result<(), HwError> {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| HwError::Uplink(format!("no address for {}", self.host)))?;
        let mut stream = TcpStream::connect_timeout(&addr, self.io_timeout)?;
        stream.set_read_timeout(Some(self.io_timeout))?;
        stream.set_write_timeout(Some(self.io_timeout))?;
        stream.write_all(request.as_bytes())?;

        // Drain whatever the server sends back; the content is irrelevant
        // but leaving it unread can reset the connection mid-response.
        let mut sink = [0u8; 512];
        loop {
            match stream.read(&mut sink) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "discarding upload response failed");
                    break;
                }
            }
        }
        Ok(())
    }
}

impl Uplink for HttpUplink {
    fn upload(&mut self, fields: &[MetricField]) -> HwResult<()> {
        let body = Self::body(fields);
        let request = self.request(&body);
        tracing::debug!(host = %self.host, body = %body, "posting metrics");
        self.exchange(&request)?;
        Ok(())
    }
}
