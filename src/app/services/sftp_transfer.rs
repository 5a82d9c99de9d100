//! SFTP delivery of the generated flat file
//!
//! Uploads the output file to the Symphony server so the scheduled load users
//! report can pick it up. The server's host key is checked against a known
//! hosts file unless the configuration explicitly disables verification.

use crate::config::{Config, HostKeyCheck, SftpConfig};
use crate::constants::SFTP_CONNECT_TIMEOUT_SECS;
use crate::{Error, Result};
use ssh2::{CheckResult, FileStat, KnownHostFileKind, Session};
use std::fs::File;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    pub remote_path: PathBuf,
    pub bytes: u64,
}

/// Something that can deliver a finished file
pub trait FileTransfer {
    fn upload(&self, local: &Path) -> Result<TransferSummary>;
}

/// SFTP client built on libssh2
#[derive(Debug, Clone)]
pub struct SftpTransfer {
    settings: SftpConfig,
    known_hosts: PathBuf,
}

impl SftpTransfer {
    /// Build a client from the `[sftp]` section
    ///
    /// With strict host key checking the known hosts file must exist.
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = config.require_sftp()?.clone();
        let known_hosts = config
            .known_hosts_path()
            .ok_or_else(|| Error::configuration("[sftp] section is missing"))?;

        if settings.host_key_check == HostKeyCheck::Strict && !known_hosts.is_file() {
            return Err(Error::transfer(format!(
                "known hosts file {} not found; add the server key or set host_key_check = \"disabled\"",
                known_hosts.display()
            )));
        }

        Ok(Self {
            settings,
            known_hosts,
        })
    }

    fn connect(&self) -> Result<Session> {
        let address = format!("{}:{}", self.settings.server, self.settings.port);
        let socket = address
            .to_socket_addrs()
            .map_err(|e| Error::transfer(format!("cannot resolve {}: {}", address, e)))?
            .next()
            .ok_or_else(|| Error::transfer(format!("no address found for {}", address)))?;

        let tcp = TcpStream::connect_timeout(&socket, Duration::from_secs(SFTP_CONNECT_TIMEOUT_SECS))
            .map_err(|e| Error::transfer(format!("cannot connect to {}: {}", address, e)))?;
        debug!("Connected to {}", address);

        let mut session =
            Session::new().map_err(|e| Error::transfer_ssh("cannot create SSH session", e))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| Error::transfer_ssh(format!("SSH handshake with {} failed", address), e))?;

        self.verify_host_key(&session)?;

        session
            .userauth_password(&self.settings.user, &self.settings.password)
            .map_err(|e| {
                Error::transfer_ssh(
                    format!("authentication as {} failed", self.settings.user),
                    e,
                )
            })?;
        if !session.authenticated() {
            return Err(Error::transfer(format!(
                "authentication as {} failed",
                self.settings.user
            )));
        }

        Ok(session)
    }

    fn verify_host_key(&self, session: &Session) -> Result<()> {
        if self.settings.host_key_check == HostKeyCheck::Disabled {
            warn!(
                "Skipping host key verification for {} (host_key_check = \"disabled\")",
                self.settings.server
            );
            return Ok(());
        }

        let mut known_hosts = session
            .known_hosts()
            .map_err(|e| Error::transfer_ssh("cannot initialise known hosts", e))?;
        known_hosts
            .read_file(&self.known_hosts, KnownHostFileKind::OpenSSH)
            .map_err(|e| {
                Error::transfer_ssh(
                    format!("cannot read known hosts file {}", self.known_hosts.display()),
                    e,
                )
            })?;

        let (key, _) = session
            .host_key()
            .ok_or_else(|| Error::transfer("server did not present a host key"))?;

        match known_hosts.check_port(&self.settings.server, self.settings.port, key) {
            CheckResult::Match => {
                debug!("Host key for {} verified", self.settings.server);
                Ok(())
            }
            CheckResult::Mismatch => Err(Error::transfer(format!(
                "host key for {} does not match {}",
                self.settings.server,
                self.known_hosts.display()
            ))),
            CheckResult::NotFound => Err(Error::transfer(format!(
                "no entry for {} in {}",
                self.settings.server,
                self.known_hosts.display()
            ))),
            CheckResult::Failure => Err(Error::transfer(format!(
                "host key check for {} failed",
                self.settings.server
            ))),
        }
    }
}

impl FileTransfer for SftpTransfer {
    /// Upload `local` into the configured remote directory, keeping its mtime
    fn upload(&self, local: &Path) -> Result<TransferSummary> {
        let file_name = local
            .file_name()
            .ok_or_else(|| Error::transfer(format!("{} has no file name", local.display())))?;
        let remote_path = Path::new(&self.settings.remote_dir).join(file_name);

        let mut source = File::open(local)
            .map_err(|e| Error::io(format!("cannot open {}", local.display()), e))?;
        let metadata = source
            .metadata()
            .map_err(|e| Error::io(format!("cannot stat {}", local.display()), e))?;

        let session = self.connect()?;
        let sftp = session
            .sftp()
            .map_err(|e| Error::transfer_ssh("cannot start SFTP subsystem", e))?;

        let mut remote = sftp.create(&remote_path).map_err(|e| {
            Error::transfer_ssh(format!("cannot create {}", remote_path.display()), e)
        })?;
        let bytes = copy_to_remote(&mut source, &mut remote, &remote_path)?;
        drop(remote);

        if let Some(mtime) = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        {
            let stat = FileStat {
                size: None,
                uid: None,
                gid: None,
                perm: None,
                atime: Some(mtime.as_secs()),
                mtime: Some(mtime.as_secs()),
            };
            if let Err(e) = sftp.setstat(&remote_path, stat) {
                warn!(
                    "Could not preserve modification time on {}: {}",
                    remote_path.display(),
                    e
                );
            }
        }

        if let Err(e) = session.disconnect(None, "upload complete", None) {
            debug!("Disconnect from {} failed: {}", self.settings.server, e);
        }

        info!(
            "Uploaded {} bytes to {}:{}",
            bytes,
            self.settings.server,
            remote_path.display()
        );

        Ok(TransferSummary { remote_path, bytes })
    }
}

/// Stream `source` into an open remote file
fn copy_to_remote<R: Read, W: Write>(
    source: &mut R,
    remote: &mut W,
    remote_path: &Path,
) -> Result<u64> {
    let bytes = std::io::copy(source, remote).map_err(|e| {
        Error::transfer(format!("upload to {} failed: {}", remote_path.display(), e))
    })?;
    remote.flush().map_err(|e| {
        Error::transfer(format!("upload to {} failed: {}", remote_path.display(), e))
    })?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BASE_CONFIG: &str = r#"
[filenames]
csv_name = "students.csv"
ascii_name = "LDUSER.txt"

[data]
expire_day = "0630"
USER_ROUTING_FLAG = "Y"
USER_NAME_DSP_PREF = "0"
USER_LIBRARY = "MAIN"
USER_PROFILE = "STUDENT"
USER_ACCESS = "PUBLIC"
USER_ENVIRONMENT = "PUBLIC"
USER_CATEGORY1 = "STUDENT"
USER_CATEGORY11 = "DISTRICT"
USER_STATUS = "OK"
NOTIFY_VIA = "EMAIL"
USER_CHG_HIST_RULE = "ALLCHARGES"
"#;

    fn config_with_sftp(dir: &Path, sftp: &str) -> Config {
        Config::from_toml_str(&format!("{}\n[sftp]\n{}", BASE_CONFIG, sftp), dir).unwrap()
    }

    #[test]
    fn test_missing_sftp_section() {
        let config = Config::from_toml_str(BASE_CONFIG, Path::new(".")).unwrap();
        assert!(matches!(
            SftpTransfer::from_config(&config),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_strict_requires_known_hosts_file() {
        let dir = TempDir::new().unwrap();
        let config = config_with_sftp(
            dir.path(),
            "server = \"127.0.0.1\"\nuser = \"u\"\npassword = \"p\"\n",
        );

        let err = SftpTransfer::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::Transfer { .. }));
        assert!(err.to_string().contains("known hosts"));

        std::fs::write(dir.path().join("known_hosts"), "").unwrap();
        assert!(SftpTransfer::from_config(&config).is_ok());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_interrupted_upload_is_transfer_error() {
        let mut source: &[u8] = b"*** DOCUMENT BOUNDARY ***\n";
        let err = copy_to_remote(&mut source, &mut BrokenPipe, Path::new("./LDUSER.txt"))
            .unwrap_err();

        assert!(matches!(err, Error::Transfer { .. }));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_copy_to_remote_counts_bytes() {
        let mut source: &[u8] = b"FORM=LDUSER\n";
        let mut remote = Vec::new();

        let bytes = copy_to_remote(&mut source, &mut remote, Path::new("LDUSER.txt")).unwrap();

        assert_eq!(bytes, 12);
        assert_eq!(remote, b"FORM=LDUSER\n");
    }

    #[test]
    fn test_connection_refused_is_transfer_error() {
        let dir = TempDir::new().unwrap();
        // Grab a free port and release it so nothing is listening there
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = config_with_sftp(
            dir.path(),
            &format!(
                "server = \"127.0.0.1\"\nport = {}\nuser = \"u\"\npassword = \"p\"\nhost_key_check = \"disabled\"\n",
                port
            ),
        );
        let report = dir.path().join("LDUSER.txt");
        std::fs::write(&report, "x").unwrap();

        let transfer = SftpTransfer::from_config(&config).unwrap();
        let err = transfer.upload(&report).unwrap_err();

        assert!(matches!(err, Error::Transfer { .. }));
    }
}
