//! Low-level SMTP stream handling.

use crate::error::{Error, Result};
use rustls::pki_types::ServerName;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    rustls::{ClientConfig, RootCertStore},
};
use tracing::debug;

/// Line-oriented byte transport the client speaks SMTP over.
pub trait Transport {
    /// Reads one line, without its line terminator.
    ///
    /// Fails with [`Error::ConnectionClosed`] at end of stream.
    fn recv_line(&mut self) -> impl Future<Output = Result<String>> + Send;

    /// Writes and flushes `data`.
    fn send(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;
}

impl<T> Transport for BufReader<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn recv_line(&mut self) -> Result<String> {
        read_trimmed_line(self).await
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        write_flushed(self.get_mut(), data).await
    }
}

/// SMTP stream (TCP or TLS).
#[derive(Debug)]
pub enum SmtpStream {
    /// Plain TCP connection.
    Tcp(BufReader<TcpStream>),
    /// TLS-encrypted connection.
    Tls(Box<BufReader<tokio_rustls::client::TlsStream<TcpStream>>>),
}

impl SmtpStream {
    /// Upgrades a TCP stream to TLS.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is already encrypted or the TLS handshake fails.
    pub async fn upgrade_to_tls(self, hostname: &str) -> Result<Self> {
        let tcp_stream = match self {
            Self::Tcp(reader) => reader.into_inner(),
            Self::Tls(_) => return Err(Error::Protocol("Already using TLS".into())),
        };

        let tls_stream = tls_handshake(hostname, tcp_stream).await?;
        Ok(Self::Tls(Box::new(BufReader::new(tls_stream))))
    }
}

impl Transport for SmtpStream {
    async fn recv_line(&mut self) -> Result<String> {
        match self {
            Self::Tcp(reader) => read_trimmed_line(reader).await,
            Self::Tls(reader) => read_trimmed_line(reader.as_mut()).await,
        }
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        match self {
            Self::Tcp(reader) => write_flushed(reader.get_mut(), data).await,
            Self::Tls(reader) => write_flushed(reader.get_mut(), data).await,
        }
    }
}

/// Connects to an SMTP server over plain TCP (ports 25 and 587).
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn connect(hostname: &str, port: u16) -> Result<SmtpStream> {
    debug!(host = hostname, port, "connecting (plain)");
    let stream = TcpStream::connect((hostname, port)).await?;
    Ok(SmtpStream::Tcp(BufReader::new(stream)))
}

/// Connects to an SMTP server over TLS (implicit TLS on port 465).
///
/// # Errors
///
/// Returns an error if the connection or TLS handshake fails.
pub async fn connect_tls(hostname: &str, port: u16) -> Result<SmtpStream> {
    debug!(host = hostname, port, "connecting (implicit TLS)");
    let tcp_stream = TcpStream::connect((hostname, port)).await?;
    let tls_stream = tls_handshake(hostname, tcp_stream).await?;
    Ok(SmtpStream::Tls(Box::new(BufReader::new(tls_stream))))
}

async fn tls_handshake(
    hostname: &str,
    tcp_stream: TcpStream,
) -> Result<tokio_rustls::client::TlsStream<TcpStream>> {
    let server_name = ServerName::try_from(hostname.to_string())
        .map_err(|_| Error::InvalidHostname(hostname.to_string()))?;
    let tls_stream = create_tls_connector()
        .connect(server_name, tcp_stream)
        .await?;
    Ok(tls_stream)
}

/// Creates a TLS connector trusting the bundled web PKI roots.
fn create_tls_connector() -> TlsConnector {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

async fn read_trimmed_line<R>(reader: &mut R) -> Result<String>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut line = String::new();
    if AsyncBufReadExt::read_line(reader, &mut line).await? == 0 {
        return Err(Error::ConnectionClosed);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn write_flushed<W>(writer: &mut W, data: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    AsyncWriteExt::write_all(writer, data).await?;
    AsyncWriteExt::flush(writer).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_recv_line_strips_crlf() {
        let mock = Builder::new().read(b"220 ready\r\n250 OK\r\n").build();
        let mut transport = BufReader::new(mock);
        assert_eq!(transport.recv_line().await.unwrap(), "220 ready");
        assert_eq!(transport.recv_line().await.unwrap(), "250 OK");
    }

    #[tokio::test]
    async fn test_recv_line_at_eof() {
        let mock = Builder::new().build();
        let mut transport = BufReader::new(mock);
        assert!(matches!(
            transport.recv_line().await,
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_send_writes_bytes() {
        let mock = Builder::new().write(b"QUIT\r\n").build();
        let mut transport = BufReader::new(mock);
        transport.send(b"QUIT\r\n").await.unwrap();
    }
}
