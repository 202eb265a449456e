//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

type Keyspace = Arc<DashMap<(i64, String), String>>;

/// Behaviour switches for [`start_mock_redis_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MockRedis {
    /// Require AUTH with this password before any other command.
    pub password: Option<&'static str>,
    /// Close the connection right after answering the first PING the server
    /// sees, then keep accepting new connections normally.
    pub drop_after_first_ping: bool,
}

/// Start a minimal RESP2 server on an ephemeral port.
///
/// Understands PING, AUTH, SELECT, CLIENT, GET, SET, DEL, EXISTS, INCRBY and
/// QUIT. When `password` is set, every other command answers NOAUTH until the
/// connection authenticates.
#[allow(dead_code)]
pub async fn start_mock_redis(password: Option<&'static str>) -> SocketAddr {
    start_mock_redis_with(MockRedis {
        password,
        ..MockRedis::default()
    })
    .await
}

/// Like [`start_mock_redis`], with every behaviour switch available.
///
/// Each logical database has its own keyspace; `SELECT` switches the
/// connection between them.
#[allow(dead_code)]
pub async fn start_mock_redis_with(options: MockRedis) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let data: Keyspace = Arc::new(DashMap::new());
    let drop_pending = Arc::new(AtomicBool::new(options.drop_after_first_ping));

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let data = data.clone();
                    let drop_pending = drop_pending.clone();
                    tokio::spawn(async move {
                        let _ = serve_connection(socket, data, options.password, drop_pending).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a server that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// A local port with nothing listening on it.
#[allow(dead_code)]
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn serve_connection(
    socket: TcpStream,
    data: Keyspace,
    password: Option<&'static str>,
    drop_pending: Arc<AtomicBool>,
) -> std::io::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let mut authenticated = password.is_none();
    let mut db: i64 = 0;

    while let Some(args) = read_command(&mut reader).await? {
        if args.is_empty() {
            continue;
        }
        let name = args[0].to_ascii_uppercase();
        let reply = match name.as_str() {
            "AUTH" => {
                let given = args.last().map(String::as_str);
                if password.is_some() && given == password && args.len() >= 2 {
                    authenticated = true;
                    "+OK\r\n".to_string()
                } else if password.is_none() {
                    "-ERR AUTH <password> called without any password configured for the default user\r\n"
                        .to_string()
                } else {
                    "-WRONGPASS invalid username-password pair or user is disabled.\r\n".to_string()
                }
            }
            "QUIT" => {
                writer.write_all(b"+OK\r\n").await?;
                return Ok(());
            }
            _ if !authenticated => "-NOAUTH Authentication required.\r\n".to_string(),
            "PING" => {
                if drop_pending.swap(false, Ordering::SeqCst) {
                    writer.write_all(b"+PONG\r\n").await?;
                    return Ok(());
                }
                "+PONG\r\n".to_string()
            }
            "SELECT" if args.len() == 2 => match args[1].parse::<i64>() {
                Ok(index) if index >= 0 => {
                    db = index;
                    "+OK\r\n".to_string()
                }
                _ => "-ERR DB index is out of range\r\n".to_string(),
            },
            "CLIENT" => "+OK\r\n".to_string(),
            "GET" if args.len() == 2 => match data.get(&(db, args[1].clone())) {
                Some(value) => bulk(value.value()),
                None => "$-1\r\n".to_string(),
            },
            "SET" if args.len() >= 3 => {
                data.insert((db, args[1].clone()), args[2].clone());
                "+OK\r\n".to_string()
            }
            "DEL" => {
                let removed = args[1..]
                    .iter()
                    .filter(|k| data.remove(&(db, k.to_string())).is_some())
                    .count();
                format!(":{}\r\n", removed)
            }
            "EXISTS" => {
                let found = args[1..]
                    .iter()
                    .filter(|k| data.contains_key(&(db, k.to_string())))
                    .count();
                format!(":{}\r\n", found)
            }
            "INCRBY" if args.len() == 3 => incr_by(&data, (db, args[1].clone()), &args[2]),
            _ => format!("-ERR unknown command '{}'\r\n", args[0]),
        };
        writer.write_all(reply.as_bytes()).await?;
    }

    Ok(())
}

fn incr_by(data: &DashMap<(i64, String), String>, key: (i64, String), delta: &str) -> String {
    let Ok(delta) = delta.parse::<i64>() else {
        return "-ERR value is not an integer or out of range\r\n".to_string();
    };
    let mut entry = data.entry(key).or_insert_with(|| "0".to_string());
    match entry.value().parse::<i64>() {
        Ok(current) => {
            let next = current + delta;
            *entry.value_mut() = next.to_string();
            format!(":{}\r\n", next)
        }
        Err(_) => "-ERR value is not an integer or out of range\r\n".to_string(),
    }
}

fn bulk(value: &str) -> String {
    format!("${}\r\n{}\r\n", value.len(), value)
}

/// Read one command: a RESP array of bulk strings or an inline command.
async fn read_command<R>(reader: &mut BufReader<R>) -> std::io::Result<Option<Vec<String>>>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    let line = line.trim_end();

    let Some(count) = line.strip_prefix('*') else {
        return Ok(Some(line.split_whitespace().map(str::to_string).collect()));
    };
    let count: usize = count.parse().unwrap_or(0);

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        let mut header = String::new();
        if reader.read_line(&mut header).await? == 0 {
            return Ok(None);
        }
        let len: usize = header.trim_end().trim_start_matches('$').parse().unwrap_or(0);
        let mut buf = vec![0u8; len + 2];
        reader.read_exact(&mut buf).await?;
        buf.truncate(len);
        args.push(String::from_utf8_lossy(&buf).into_owned());
    }

    Ok(Some(args))
}
