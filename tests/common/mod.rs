//! テスト用HTTPスタブ
//!
//! 1リクエストだけ受けて固定レスポンスを返す。

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl StubResponse {
    pub fn ok(body: &str) -> Self {
        Self { status: 200, body: body.to_string(), delay: Duration::ZERO }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self { status, body: body.to_string(), delay: Duration::ZERO }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// スタブを起動し (URL, 受信したリクエスト全文を返すハンドル) を返す
pub async fn serve_once(response: StubResponse) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept failed");
        let request = read_request(&mut socket).await;

        tokio::time::sleep(response.delay).await;

        let reason = if response.status < 400 { "OK" } else { "Error" };
        let reply = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            response.status,
            reason,
            response.body.len(),
            response.body
        );
        let _ = socket.write_all(reply.as_bytes()).await;
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{}/v1/plugins/ai_analyze_image", addr), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);

        if let Some(header_end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buffer).to_string()
}

pub const ANALYSIS_BODY: &str = r#"{
    "session_id": "sess-42",
    "device": "Angle grinder",
    "appliance_classification": {"protection_class": "II"},
    "technical_data": {"model_number": "AG-125", "voltage": "230 V", "serial_number": "SN-1"},
    "tests": {
        "visual_inspection": {
            "display_order": 1,
            "items": [
                {"execution_order": 1, "name": "Housing"},
                {"execution_order": 2, "name": "Cable"}
            ]
        },
        "electrical_inspection": {
            "display_order": 2,
            "items": [
                {
                    "execution_order": 1,
                    "name": "Insulation",
                    "measure": "MΩ",
                    "lower_limits": 2,
                    "upper_limits": "-"
                }
            ]
        },
        "functional_inspection": {
            "display_order": 3,
            "items": [{"execution_order": "1", "name": "Switch"}]
        }
    }
}"#;
