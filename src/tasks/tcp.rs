// Smell-It — TCP Server Task
//
// Accepts one client at a time on port 3333. Every chunk received is trimmed
// to its first line and queued for the display, then echoed back verbatim.
// Per-message and per-connection failures are logged here and never end the
// task; only a failed accept does.

use std::io::{ErrorKind, Read, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddrV4, TcpListener, TcpStream};

use crate::config::*;
use crate::error::Result;
use crate::relay::{RelayMessage, RelayProducer};

pub fn tcp_server_task(relay: RelayProducer) {
    log::info!("TCP server task started");

    if let Err(e) = run_server(&relay) {
        log::error!("TCP server stopped: {:#}", e);
    }
}

fn run_server(relay: &RelayProducer) -> anyhow::Result<()> {
    let listener = TcpListener::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, TCP_PORT))?;
    log::info!("Socket bound, port {}", TCP_PORT);

    loop {
        log::info!("Socket listening");
        let (mut stream, peer) = listener.accept()?;

        set_keepalive(&stream);
        log::info!("Socket accepted ip address: {}", peer.ip());

        if let Err(e) = serve_session(&mut stream, relay) {
            log::error!("Session with {} ended: {}", peer, e);
        }

        let _ = stream.shutdown(Shutdown::Read);
    }
}

/// Relay-and-echo loop for one connected client.
///
/// Returns `Ok(())` when the peer closes the connection and an error on a
/// transport failure. A queue timeout loses that one display update but keeps
/// the session going.
pub fn serve_session<S: Read + Write>(stream: &mut S, relay: &RelayProducer) -> Result<()> {
    let mut rx = [0u8; TCP_RX_BUFFER_SIZE];

    loop {
        // One byte short of the buffer, like a C string with its terminator.
        let len = match stream.read(&mut rx[..TCP_RX_BUFFER_SIZE - 1]) {
            Ok(0) => {
                log::warn!("Connection closed");
                return Ok(());
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                log::error!("Error occurred during receiving: {}", e);
                return Err(e.into());
            }
        };
        let chunk = &rx[..len];
        log::info!("Received {} bytes: {}", len, String::from_utf8_lossy(chunk));

        if let Err(e) = relay.enqueue(RelayMessage::from_chunk(chunk), RELAY_ENQUEUE_TIMEOUT) {
            log::warn!("Display update dropped: {}", e);
        }

        // `write_all` retries short writes.
        if let Err(e) = stream.write_all(chunk) {
            log::error!("Error occurred during sending: {}", e);
            return Err(e.into());
        }
    }
}

#[cfg(target_os = "espidf")]
fn set_keepalive(stream: &TcpStream) {
    use std::os::fd::AsRawFd;

    use esp_idf_sys as sys;

    let fd = stream.as_raw_fd();
    let options = [
        (sys::SOL_SOCKET as i32, sys::SO_KEEPALIVE as i32, 1),
        (sys::IPPROTO_TCP as i32, sys::TCP_KEEPIDLE as i32, KEEPALIVE_IDLE_S),
        (sys::IPPROTO_TCP as i32, sys::TCP_KEEPINTVL as i32, KEEPALIVE_INTERVAL_S),
        (sys::IPPROTO_TCP as i32, sys::TCP_KEEPCNT as i32, KEEPALIVE_COUNT),
    ];

    for (level, name, value) in options {
        let ret = unsafe {
            sys::lwip_setsockopt(
                fd,
                level,
                name,
                &value as *const i32 as *const core::ffi::c_void,
                core::mem::size_of::<i32>() as sys::socklen_t,
            )
        };
        if ret != 0 {
            log::warn!("setsockopt({}, {}) failed ({})", level, name, ret);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
fn set_keepalive(_stream: &TcpStream) {}
