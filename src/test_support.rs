//! In-process stand-in for a Shelly gateway, used by the unit tests.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Three valves (only 200 named) plus gateway-internal and bthome entries.
pub const GATEWAY_RESPONSE: &str = r#"{"components":[{"key":"ble","status":{},"config":{"enable":true,"rpc":{"enable":true}}},{"key":"blugw","status":{},"config":{"sys_led_enable":true}},{"key":"blutrv:200","status":{"id":200,"target_C":17.8,"current_C":18.5,"pos":54,"connected":true,"rssi":-60,"battery":100,"packet_id":243,"last_updated_ts":1766497610,"paired":true,"rpc":true,"rsv":56,"fw_ver":"v1.2.10"},"config":{"id":200,"addr":"f8:44:77:1d:05:54","name":"TRV-200","key":null,"trv":"bthomedevice:200","temp_sensors":[],"dw_sensors":[],"override_delay":30,"meta":null},"attrs":{"flags":17,"model_id":8}},{"key":"blutrv:201","status":{"id":201,"target_C":19.5,"current_C":20.1,"pos":1,"connected":true,"rssi":-60,"battery":100,"packet_id":80,"last_updated_ts":1766497602,"paired":true,"rpc":true,"rsv":16,"fw_ver":"v1.2.10"},"config":{"id":201,"addr":"28:68:47:ef:8f:c9","name":null,"key":null,"trv":"bthomedevice:201","temp_sensors":[],"dw_sensors":[],"override_delay":30,"meta":null},"attrs":{"flags":17,"model_id":8}},{"key":"blutrv:202","status":{"id":202,"target_C":17.5,"current_C":16.9,"pos":4,"connected":true,"rssi":-72,"battery":100,"packet_id":52,"last_updated_ts":1766497618,"paired":true,"rpc":true,"rsv":1,"fw_ver":"v1.2.10"},"config":{"id":202,"addr":"28:68:47:fd:b9:d8","name":null,"key":null,"trv":"bthomedevice:202","temp_sensors":[],"dw_sensors":[],"override_delay":30,"meta":null},"attrs":{"flags":17,"model_id":8}},{"key":"bthome","status":{},"config":{}},{"key":"bthomedevice:200","status":{"id":200,"rssi":-60,"battery":100,"fw_ver":"v1.2.10"},"config":{"id":200,"name":null},"attrs":{"flags":17,"model_id":8}}],"cfg_rev":29,"offset":0,"total":23}"#;

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay_ms: AtomicU64,
}

/// Serves the given bodies with `200 OK`, one per request, repeating the
/// last one once the list is exhausted.
#[derive(Debug)]
pub struct StubGateway {
    address: String,
    counters: Arc<Counters>,
    task: JoinHandle<()>,
}

impl StubGateway {
    pub async fn start(bodies: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let counters = Arc::new(Counters::default());
        let bodies = Arc::new(bodies);

        let task = {
            let counters = counters.clone();
            tokio::spawn(async move {
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        break;
                    };
                    let counters = counters.clone();
                    let bodies = bodies.clone();
                    tokio::spawn(async move { respond(stream, &counters, &bodies).await });
                }
            })
        };

        Self {
            address,
            counters,
            task,
        }
    }

    /// Hold every response back for `delay`.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.set_delay(delay);
        self
    }

    pub fn set_delay(&self, delay: Duration) {
        self.counters
            .delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn requests(&self) -> usize {
        self.counters.requests.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.counters.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Drop for StubGateway {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn respond(mut stream: TcpStream, counters: &Counters, bodies: &[String]) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let index = counters.requests.fetch_add(1, Ordering::SeqCst);
    let in_flight = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    counters.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

    let delay = counters.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    // Leave before answering so the next serialized request never overlaps.
    counters.in_flight.fetch_sub(1, Ordering::SeqCst);

    let body = bodies
        .get(index)
        .or_else(|| bodies.last())
        .map(String::as_str)
        .unwrap_or("");
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
