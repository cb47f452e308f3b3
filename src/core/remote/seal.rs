//! Client-side sealing of package content.
//!
//! Content is encrypted with age using a passphrase recipient derived from
//! the package's server secret and key code. Files are sealed as binary age
//! streams; messages are ASCII-armored so they travel inside JSON.

use std::io::{self, Read, Write};
use std::iter;

use age::secrecy::SecretString;
use sha2::{Digest, Sha256};
use tracing::trace;
use zeroize::Zeroizing;

/// Copy buffer size for sealing streams.
const CHUNK: usize = 64 * 1024;

/// Encrypts content for one package.
pub struct Sealer {
    passphrase: Zeroizing<String>,
    work_factor: Option<u8>,
}

impl Sealer {
    /// Sealer for the package whose server secret and key code are given.
    pub fn new(server_secret: &str, key_code: &str) -> Self {
        Self {
            passphrase: Zeroizing::new(format!("{}{}", server_secret, key_code)),
            work_factor: None,
        }
    }

    /// Override the scrypt work factor (log2 of N).
    ///
    /// Lower values are only meant for tests and benchmarks.
    pub fn with_work_factor(mut self, log_n: Option<u8>) -> Self {
        self.work_factor = log_n;
        self
    }

    fn encryptor(&self) -> io::Result<age::Encryptor> {
        let mut recipient =
            age::scrypt::Recipient::new(SecretString::from(self.passphrase.to_string()));
        if let Some(log_n) = self.work_factor {
            recipient.set_work_factor(log_n);
        }
        age::Encryptor::with_recipients(iter::once(&recipient as &dyn age::Recipient))
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }

    /// Seal everything read from `input` into `output`.
    ///
    /// Returns the plaintext byte count.
    pub fn seal<R: Read + ?Sized, W: Write>(&self, input: &mut R, output: W) -> io::Result<u64> {
        let mut writer = self.encryptor()?.wrap_output(output)?;

        let mut buf = vec![0u8; CHUNK];
        let mut total = 0u64;
        loop {
            let n = input.read(&mut buf)?;
            if n == 0 {
                break;
            }
            writer.write_all(&buf[..n])?;
            total += n as u64;
        }
        writer.finish()?.flush()?;

        trace!(plaintext_len = total, "sealed stream");
        Ok(total)
    }

    /// Seal a text message into ASCII armor.
    pub fn seal_armored(&self, text: &str) -> io::Result<String> {
        let mut sealed = Vec::new();
        let armor = age::armor::ArmoredWriter::wrap_output(&mut sealed, age::armor::Format::AsciiArmor)?;
        let mut writer = self.encryptor()?.wrap_output(armor)?;
        writer.write_all(text.as_bytes())?;
        writer.finish()?.finish()?;

        String::from_utf8(sealed).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Decrypt content sealed for the same passphrase.
    pub fn open<R: Read>(&self, sealed: R) -> io::Result<Vec<u8>> {
        let reader = age::armor::ArmoredReader::new(sealed);
        let decryptor = age::Decryptor::new(reader)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

        let identity = age::scrypt::Identity::new(SecretString::from(self.passphrase.to_string()));
        let mut reader = decryptor
            .decrypt(iter::once(&identity as &dyn age::Identity))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

        let mut plain = Vec::new();
        reader.read_to_end(&mut plain)?;
        Ok(plain)
    }
}

/// Writer that hashes and counts everything passing through it.
pub struct Digesting<W> {
    inner: W,
    hasher: Sha256,
    written: u64,
}

impl<W: Write> Digesting<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            written: 0,
        }
    }

    /// Hex SHA-256 and byte count of everything written.
    pub fn finish(mut self) -> io::Result<(String, u64)> {
        self.inner.flush()?;
        Ok((hex::encode(self.hasher.finalize()), self.written))
    }
}

impl<W: Write> Write for Digesting<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
