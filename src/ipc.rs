//! Single-instance command channel
//!
//! The resident instance listens on a Unix domain socket; later invocations
//! connect and send one UTF-8 command per line (`SNIP`, `EDITOR`, `QUIT`).
//! Anything after a `:` is reserved for arguments and currently ignored.
//! Received commands are forwarded to the controller over an `mpsc` channel.

use std::{
    fmt,
    io,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{UnixListener, UnixStream},
    sync::mpsc,
    task::JoinHandle,
};

use crate::error::{AppError, AppResult};

/// Socket file name inside the runtime directory
pub const SOCKET_NAME: &str = "snipdesk.sock";

/// How long a client waits for the resident instance to accept
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Message understood by the resident instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Open the selection overlay
    Snip,
    /// Open an empty editor window
    Editor,
    /// Shut down
    Quit,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Snip => "SNIP",
            Command::Editor => "EDITOR",
            Command::Quit => "QUIT",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let name = line.trim().split(':').next().unwrap_or_default();
        match name {
            "SNIP" => Ok(Command::Snip),
            "EDITOR" => Ok(Command::Editor),
            "QUIT" => Ok(Command::Quit),
            _ => Err(format!("unknown command '{}'", line.trim())),
        }
    }
}

/// `$XDG_RUNTIME_DIR/snipdesk.sock`, or the temp dir when unset
pub fn socket_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(SOCKET_NAME)
}

/// Sends `command` to a resident instance.
///
/// Returns `false` when no instance accepts within [`CONNECT_TIMEOUT`].
pub async fn send_command(path: &Path, command: Command) -> bool {
    let stream = match tokio::time::timeout(CONNECT_TIMEOUT, UnixStream::connect(path)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            tracing::debug!("No instance listening on {}: {}", path.display(), e);
            return false;
        }
        Err(_) => {
            tracing::debug!("Timed out connecting to {}", path.display());
            return false;
        }
    };

    match write_line(stream, command).await {
        Ok(()) => {
            tracing::info!("Sent {} to running instance", command);
            true
        }
        Err(e) => {
            tracing::warn!("Failed to send {} to {}: {}", command, path.display(), e);
            false
        }
    }
}

async fn write_line(mut stream: UnixStream, command: Command) -> io::Result<()> {
    stream.write_all(format!("{}\n", command).as_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await
}

/// Listening side of the command channel
#[derive(Debug)]
pub struct IpcServer {
    path:     PathBuf,
    listener: UnixListener,
}

impl IpcServer {
    /// Binds the socket at `path`, replacing a stale socket file.
    ///
    /// Call only after [`send_command`] found no running instance.
    pub fn bind(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        if path.exists() {
            tracing::debug!("Removing stale socket {}", path.display());
            std::fs::remove_file(&path).map_err(AppError::Ipc)?;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(AppError::Ipc)?;
        }

        let listener = UnixListener::bind(&path).map_err(AppError::Ipc)?;
        tracing::info!("Listening for commands on {}", path.display());
        Ok(Self { path, listener })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accepts connections until `commands` is closed
    pub fn spawn(self, commands: mpsc::Sender<Command>) -> JoinHandle<()> {
        tokio::spawn(self.run(commands))
    }

    async fn run(self, commands: mpsc::Sender<Command>) {
        loop {
            let stream = tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, _)) => stream,
                    Err(e) => {
                        tracing::warn!("Failed to accept IPC connection: {}", e);
                        continue;
                    }
                },
                _ = commands.closed() => break,
            };
            tokio::spawn(handle_connection(stream, commands.clone()));
        }
        tracing::debug!("IPC server on {} stopped", self.path.display());
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

async fn handle_connection(stream: UnixStream, commands: mpsc::Sender<Command>) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => {
                tracing::info!("IPC message received: {}", line.trim());
                match line.parse::<Command>() {
                    Ok(command) => {
                        if commands.send(command).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => tracing::warn!("Ignoring IPC message: {}", e),
                }
            }
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("IPC connection error: {}", e);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!("SNIP".parse::<Command>().unwrap(), Command::Snip);
        assert_eq!("EDITOR\n".parse::<Command>().unwrap(), Command::Editor);
        assert_eq!("QUIT".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("SNIP:freeform:3".parse::<Command>().unwrap(), Command::Snip);
        assert!("snap".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn test_socket_path_name() {
        assert!(socket_path().ends_with(SOCKET_NAME));
    }

    #[tokio::test]
    async fn test_send_without_instance_returns_false() {
        let dir = TempDir::new().unwrap();
        assert!(!send_command(&dir.path().join(SOCKET_NAME), Command::Snip).await);
    }

    #[tokio::test]
    async fn test_commands_reach_the_channel() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SOCKET_NAME);
        let (tx, mut rx) = mpsc::channel(8);
        let handle = IpcServer::bind(&path).unwrap().spawn(tx);

        assert!(send_command(&path, Command::Editor).await);
        assert!(send_command(&path, Command::Quit).await);

        // Each send is its own connection, so arrival order is not fixed
        let received = [rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        assert!(received.contains(&Command::Editor));
        assert!(received.contains(&Command::Quit));

        drop(rx);
        handle.await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_multiple_lines_and_garbage_in_one_connection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SOCKET_NAME);
        let (tx, mut rx) = mpsc::channel(8);
        let _handle = IpcServer::bind(&path).unwrap().spawn(tx);

        let mut stream = UnixStream::connect(&path).await.unwrap();
        stream.write_all(b"hello\nSNIP:rect\n\nEDITOR\n").await.unwrap();
        stream.shutdown().await.unwrap();

        assert_eq!(rx.recv().await, Some(Command::Snip));
        assert_eq!(rx.recv().await, Some(Command::Editor));
    }

    #[tokio::test]
    async fn test_stale_socket_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SOCKET_NAME);
        std::fs::write(&path, b"leftover").unwrap();

        let server = IpcServer::bind(&path).unwrap();
        assert_eq!(server.path(), path.as_path());
    }
}
