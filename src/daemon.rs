//! Client for the backend daemon that applies pending account changes.
//!
//! The daemon speaks a short line protocol: it greets with `250`, accepts
//! `helo <version>` and `execute query` (each answered with `250`) and closes
//! the conversation on `bye` with `221`.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
    time::timeout,
};
use tracing::{debug, info};

use crate::config::DaemonConfig;

const IO_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("daemon i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("daemon did not answer in time")]
    Timeout,

    #[error("unexpected daemon reply to `{command}`: {reply}")]
    UnexpectedReply { command: String, reply: String },
}

#[async_trait]
pub trait BackendNotifier: Send + Sync {
    /// Asks the backend to process queued changes.
    async fn send_request(&self) -> Result<(), DaemonError>;
}

#[derive(Debug, Clone)]
pub struct TcpDaemonClient {
    addr: String,
    version: String,
}

impl TcpDaemonClient {
    pub fn new(config: &DaemonConfig) -> Self {
        Self {
            addr: format!("{}:{}", config.host, config.port),
            version: config.version.clone(),
        }
    }
}

async fn read_reply(reader: &mut BufReader<TcpStream>) -> Result<String, DaemonError> {
    let mut line = String::new();
    timeout(IO_TIMEOUT, reader.read_line(&mut line))
        .await
        .map_err(|_| DaemonError::Timeout)??;
    Ok(line.trim_end().to_string())
}

fn expect_code(reply: &str, code: &str, command: &str) -> Result<(), DaemonError> {
    if reply.split_whitespace().next() == Some(code) {
        Ok(())
    } else {
        Err(DaemonError::UnexpectedReply {
            command: command.to_string(),
            reply: reply.to_string(),
        })
    }
}

#[async_trait]
impl BackendNotifier for TcpDaemonClient {
    async fn send_request(&self) -> Result<(), DaemonError> {
        let stream = timeout(IO_TIMEOUT, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| DaemonError::Timeout)??;
        let mut reader = BufReader::new(stream);

        let greeting = read_reply(&mut reader).await?;
        expect_code(&greeting, "250", "connect")?;

        let helo = format!("helo {}", self.version);
        for (command, code) in [(helo.as_str(), "250"), ("execute query", "250"), ("bye", "221")] {
            reader
                .get_mut()
                .write_all(format!("{command}\r\n").as_bytes())
                .await?;
            let reply = read_reply(&mut reader).await?;
            debug!(%command, %reply, "daemon exchange");
            expect_code(&reply, code, command)?;
        }

        info!(addr = %self.addr, "backend request sent");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn fake_daemon(replies: &'static [&'static str]) -> (DaemonConfig, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);
            let mut seen = Vec::new();
            reader.get_mut().write_all(b"250 OK daemon ready\r\n").await.unwrap();
            for reply in replies {
                let mut line = String::new();
                if reader.read_line(&mut line).await.unwrap() == 0 {
                    break;
                }
                seen.push(line.trim_end().to_string());
                reader.get_mut().write_all(format!("{reply}\r\n").as_bytes()).await.unwrap();
            }
            seen
        });
        let config = DaemonConfig {
            host: "127.0.0.1".into(),
            port,
            version: "1.2.3".into(),
        };
        (config, handle)
    }

    #[tokio::test]
    async fn full_conversation() {
        let (config, handle) = fake_daemon(&["250 OK", "250 OK", "221 BYE"]).await;
        TcpDaemonClient::new(&config).send_request().await.unwrap();
        let seen = handle.await.unwrap();
        assert_eq!(seen, vec!["helo 1.2.3", "execute query", "bye"]);
    }

    #[tokio::test]
    async fn error_reply_aborts() {
        let (config, handle) = fake_daemon(&["250 OK", "500 busy"]).await;
        let err = TcpDaemonClient::new(&config).send_request().await.unwrap_err();
        match err {
            DaemonError::UnexpectedReply { command, reply } => {
                assert_eq!(command, "execute query");
                assert_eq!(reply, "500 busy");
            }
            other => panic!("unexpected error {other:?}"),
        }
        handle.await.unwrap();
    }

    #[test]
    fn expect_code_matches_first_token() {
        assert!(expect_code("250 OK", "250", "x").is_ok());
        assert!(expect_code("2500 OK", "250", "x").is_err());
        assert!(expect_code("", "250", "x").is_err());
    }
}
