//! ClientCredentials - クライアント証明書と秘密鍵の読み込み
//!
//! `kubernetes.io/tls` Secret をマウントしたディレクトリを想定し、
//! 固定のファイル名 `tls.crt` / `tls.key` から PEM を読みます。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const TLS_CERT_FILE: &str = "tls.crt";
pub const TLS_KEY_FILE: &str = "tls.key";

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} does not contain PEM data", path.display())]
    NotPem { path: PathBuf },
}

#[derive(Clone)]
pub struct ClientCredentials {
    cert_pem: Vec<u8>,
    key_pem: Vec<u8>,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 秘密鍵はログに出さない
        f.debug_struct("ClientCredentials")
            .field("cert_pem_bytes", &self.cert_pem.len())
            .finish_non_exhaustive()
    }
}

fn read_pem(path: PathBuf) -> Result<Vec<u8>, CredentialsError> {
    let data = fs::read(&path).map_err(|source| CredentialsError::Read {
        path: path.clone(),
        source,
    })?;
    if !data.windows(b"-----BEGIN".len()).any(|w| w == b"-----BEGIN") {
        return Err(CredentialsError::NotPem { path });
    }
    Ok(data)
}

impl ClientCredentials {
    pub fn load(dir: &Path) -> Result<Self, CredentialsError> {
        Ok(Self {
            cert_pem: read_pem(dir.join(TLS_CERT_FILE))?,
            key_pem: read_pem(dir.join(TLS_KEY_FILE))?,
        })
    }

    /// 証明書と秘密鍵を連結した PEM（reqwest の Identity 用）
    pub fn identity_pem(&self) -> Vec<u8> {
        let mut pem = Vec::with_capacity(self.cert_pem.len() + self.key_pem.len() + 1);
        pem.extend_from_slice(&self.cert_pem);
        if !pem.ends_with(b"\n") {
            pem.push(b'\n');
        }
        pem.extend_from_slice(&self.key_pem);
        pem
    }
}
