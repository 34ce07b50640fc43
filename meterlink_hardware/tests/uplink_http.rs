//! HTTP uplink exercised against a local single-shot stub server.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use meterlink_hardware::HttpUplink;
use meterlink_traits::{MetricField, Uplink};

/// Accept one connection, capture the request, answer 200.
fn spawn_stub(response: &'static str) -> (u16, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
    let port = listener.local_addr().expect("stub addr").port();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        stream
            .set_read_timeout(Some(Duration::from_secs(2)))
            .expect("read timeout");
        let mut captured = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            match stream.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    captured.extend_from_slice(&buf[..n]);
                    let text = String::from_utf8_lossy(&captured);
                    if let Some(header_end) = text.find("\r\n\r\n") {
                        let content_length = text
                            .lines()
                            .find_map(|l| l.strip_prefix("Content-Length: "))
                            .and_then(|v| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        if captured.len() >= header_end + 4 + content_length {
                            break;
                        }
                    }
                }
                Err(_) => break,
            }
        }
        stream.write_all(response.as_bytes()).expect("write response");
        String::from_utf8_lossy(&captured).into_owned()
    });
    (port, handle)
}

#[test]
fn upload_posts_positional_fields_with_write_key() {
    let (port, stub) = spawn_stub("HTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\n7");
    let mut uplink = HttpUplink::new(
        "127.0.0.1",
        port,
        "/update",
        "TESTKEY",
        Duration::from_secs(2),
    );

    let fields = [
        MetricField::new("power_w", 94.7),
        MetricField::new("power_total_w", 94.7),
        MetricField::new("flow_ml_s", 0.0),
        MetricField::new("volume_total_ml", 355.0),
    ];
    uplink.upload(&fields).expect("upload");

    let request = stub.join().expect("stub thread");
    assert!(request.starts_with("POST /update HTTP/1.1\r\n"));
    assert!(request.contains("Host: 127.0.0.1\r\n"));
    assert!(request.contains("X-THINGSPEAKAPIKEY: TESTKEY\r\n"));
    assert!(request.contains("Content-Type: application/x-www-form-urlencoded\r\n"));
    assert!(request.ends_with("\r\n\r\nfield1=94.7&field2=94.7&field3=0&field4=355"));
}

#[test]
fn upload_tolerates_error_status() {
    // Delivery is fire-and-forget: a 4xx answer still counts as an exchange.
    let (port, stub) = spawn_stub("HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n");
    let mut uplink = HttpUplink::new("127.0.0.1", port, "/update", "", Duration::from_secs(2));
    uplink
        .upload(&[MetricField::new("power_w", 1.0)])
        .expect("upload");
    let request = stub.join().expect("stub thread");
    assert!(request.ends_with("field1=1"));
}

#[test]
fn upload_fails_when_nobody_listens() {
    // Bind-then-drop to get a port that refuses connections.
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").expect("bind");
        l.local_addr().expect("addr").port()
    };
    let mut uplink = HttpUplink::new("127.0.0.1", port, "/update", "", Duration::from_millis(200));
    assert!(uplink.upload(&[MetricField::new("power_w", 1.0)]).is_err());
}
