//! Platform named-channel primitives.
//!
//! On Unix a channel is a domain socket under the temp directory; on Windows it is a
//! named pipe. Connecting never waits for a listener to appear: an absent or busy listener
//! is reported immediately as an error that [`is_no_listener`] recognizes.

use std::io;
use std::path::PathBuf;

/// Resolves a logical channel name to its platform address.
///
/// On Unix, a name that already contains a path separator is used as a socket path.
#[cfg(unix)]
pub fn channel_path(name: &str) -> PathBuf {
    if name.contains('/') {
        PathBuf::from(name)
    } else {
        std::env::temp_dir().join(format!("courier-{name}.sock"))
    }
}

/// Resolves a logical channel name to its platform address.
#[cfg(windows)]
pub fn channel_path(name: &str) -> PathBuf {
    PathBuf::from(format!(r"\\.\pipe\{name}"))
}

/// Returns whether a connect error means nobody is listening.
pub(crate) fn is_no_listener(err: &io::Error) -> bool {
    #[cfg(windows)]
    const ERROR_PIPE_BUSY: i32 = 231;

    #[cfg(windows)]
    if err.raw_os_error() == Some(ERROR_PIPE_BUSY) {
        return true;
    }

    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused | io::ErrorKind::WouldBlock
    )
}

#[cfg(unix)]
mod imp {
    use std::io;
    use std::path::{Path, PathBuf};

    use tokio::net::{UnixListener, UnixStream};
    use tracing::debug;

    pub(crate) type ClientStream = UnixStream;
    pub(crate) type ServerStream = UnixStream;

    pub(crate) async fn connect(path: &Path) -> io::Result<ClientStream> {
        UnixStream::connect(path).await
    }

    pub(crate) struct Listener {
        inner: UnixListener,
        path: PathBuf,
    }

    impl Listener {
        pub(crate) fn bind(path: PathBuf) -> io::Result<Self> {
            if path.exists() {
                if std::os::unix::net::UnixStream::connect(&path).is_ok() {
                    return Err(io::Error::new(
                        io::ErrorKind::AddrInUse,
                        format!("a listener is already bound to {}", path.display()),
                    ));
                }
                debug!(path = %path.display(), "Removing stale socket");
                std::fs::remove_file(&path)?;
            }
            let inner = UnixListener::bind(&path)?;
            Ok(Self { inner, path })
        }

        pub(crate) async fn accept(&mut self) -> io::Result<ServerStream> {
            let (stream, _) = self.inner.accept().await?;
            Ok(stream)
        }
    }

    impl Drop for Listener {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[cfg(windows)]
mod imp {
    use std::io;
    use std::path::{Path, PathBuf};

    use tokio::net::windows::named_pipe::{
        ClientOptions, NamedPipeClient, NamedPipeServer, PipeMode, ServerOptions,
    };

    pub(crate) type ClientStream = NamedPipeClient;
    pub(crate) type ServerStream = NamedPipeServer;

    pub(crate) async fn connect(path: &Path) -> io::Result<ClientStream> {
        ClientOptions::new()
            .read(false)
            .write(true)
            .pipe_mode(PipeMode::Byte)
            .open(path)
    }

    pub(crate) struct Listener {
        server: NamedPipeServer,
        path: PathBuf,
    }

    impl Listener {
        pub(crate) fn bind(path: PathBuf) -> io::Result<Self> {
            let server = ServerOptions::new()
                .first_pipe_instance(true)
                .access_outbound(false)
                .create(&path)?;
            Ok(Self { server, path })
        }

        pub(crate) async fn accept(&mut self) -> io::Result<ServerStream> {
            self.server.connect().await?;
            let next = ServerOptions::new()
                .access_outbound(false)
                .create(&self.path)?;
            Ok(std::mem::replace(&mut self.server, next))
        }
    }
}

pub(crate) use imp::{ClientStream, Listener, connect};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_listener_kinds() {
        assert!(is_no_listener(&io::Error::from(io::ErrorKind::NotFound)));
        assert!(is_no_listener(&io::Error::from(io::ErrorKind::ConnectionRefused)));
        assert!(!is_no_listener(&io::Error::from(io::ErrorKind::PermissionDenied)));
    }

    #[cfg(unix)]
    #[test]
    fn test_channel_path() {
        let path = channel_path("orders");
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.ends_with("courier-orders.sock"));
        assert_eq!(channel_path("/run/app.sock"), PathBuf::from("/run/app.sock"));
    }
}
