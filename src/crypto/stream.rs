//! Fragmented AEAD stream.
//!
//! Layout:
//! ```text
//! FRAGMENT_0 | FRAGMENT_1 | ... | FRAGMENT_n
//! FRAGMENT_i = AEAD(nonce || LE32(i + 1), flag || T, chunk_i) (chunk_i || TAG)
//! T          = TAG of AEAD(nonce || LE32(0), ad, "")
//! ```
//! Every chunk except the last holds exactly [`BUF_SIZE`] bytes. The last
//! holds 1..=`BUF_SIZE` bytes, or nothing when the plaintext is empty, and
//! is the only one sealed with `flag = 0x80`.

use std::io::{self, Read, Write};

use log::trace;
use zeroize::{Zeroize, Zeroizing};

use super::{AEAD_NONCE_LEN, FragmentCipher, NONCE_LEN, TAG_LEN};
use crate::error::{Error, Result};

/// Plaintext bytes per fragment.
pub const BUF_SIZE: usize = 16 * 1024;

const FLAG_MORE: u8 = 0x00;
const FLAG_FINAL: u8 = 0x80;

/// Authentication overhead added to `len` plaintext bytes.
pub fn overhead(len: usize) -> usize {
    len.div_ceil(BUF_SIZE).max(1) * TAG_LEN
}

struct NonceSequence {
    nonce: [u8; AEAD_NONCE_LEN],
    seq: Option<u32>,
}

impl NonceSequence {
    fn new(nonce: &[u8; NONCE_LEN]) -> Self {
        let mut full = [0u8; AEAD_NONCE_LEN];
        full[..NONCE_LEN].copy_from_slice(nonce);
        Self {
            nonce: full,
            seq: Some(0),
        }
    }

    fn next(&mut self) -> Result<[u8; AEAD_NONCE_LEN]> {
        let seq = self.seq.ok_or(Error::StreamLimit)?;
        self.seq = seq.checked_add(1);

        let mut nonce = self.nonce;
        nonce[NONCE_LEN..].copy_from_slice(&seq.to_le_bytes());
        Ok(nonce)
    }
}

/// Appends `data` to `out`, moving into a fresh buffer when `out` is full so
/// the outgrown allocation is wiped instead of freed as is.
fn extend_wiped(out: &mut Zeroizing<Vec<u8>>, data: &[u8]) {
    let need = out.len() + data.len();
    if need > out.capacity() {
        let mut grown = Zeroizing::new(Vec::with_capacity(need.max(2 * out.capacity())));
        grown.extend_from_slice(out);
        *out = grown;
    }
    out.extend_from_slice(data);
}

/// Binds the caller's associated data into the per-fragment AD.
fn stream_ad(
    cipher: &dyn FragmentCipher,
    nonces: &mut NonceSequence,
    ad: &[u8],
) -> Result<[u8; 1 + TAG_LEN]> {
    let mut tag = Vec::with_capacity(TAG_LEN);
    cipher.seal_fragment(&nonces.next()?, ad, &mut tag)?;

    let mut out = [0u8; 1 + TAG_LEN];
    out[1..].copy_from_slice(&tag);
    Ok(out)
}

/// Write half of the stream.
///
/// Plaintext written to it is buffered into fragments and sealed. The
/// stream is only complete after [`SealWriter::finish`]; dropping the writer
/// earlier leaves a truncated stream behind.
pub struct SealWriter<W: Write> {
    inner: W,
    cipher: Box<dyn FragmentCipher>,
    nonces: NonceSequence,
    ad: [u8; 1 + TAG_LEN],
    buf: Zeroizing<Vec<u8>>,
}

impl<W: Write> SealWriter<W> {
    pub fn new(
        inner: W,
        cipher: Box<dyn FragmentCipher>,
        nonce: &[u8; NONCE_LEN],
        ad: &[u8],
    ) -> Result<Self> {
        let mut nonces = NonceSequence::new(nonce);
        let ad = stream_ad(&*cipher, &mut nonces, ad)?;

        Ok(Self {
            inner,
            cipher,
            nonces,
            ad,
            buf: Zeroizing::new(Vec::with_capacity(BUF_SIZE + TAG_LEN)),
        })
    }

    /// Seals the pending chunk and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.seal_pending(FLAG_FINAL)?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn seal_pending(&mut self, flag: u8) -> Result<()> {
        let nonce = self.nonces.next()?;
        trace!("sealing fragment of {} bytes (flag {flag:#04x})", self.buf.len());

        self.ad[0] = flag;
        self.cipher.seal_fragment(&nonce, &self.ad, &mut self.buf)?;
        self.inner.write_all(&self.buf)?;
        self.buf.clear();
        Ok(())
    }

    fn write_chunked(&mut self, mut data: &[u8]) -> Result<()> {
        let room = BUF_SIZE - self.buf.len();
        if data.len() <= room {
            self.buf.extend_from_slice(data);
            return Ok(());
        }

        // A full chunk is only sealed once more data follows it, so the
        // final fragment is never empty unless the whole stream is.
        self.buf.extend_from_slice(&data[..room]);
        data = &data[room..];
        self.seal_pending(FLAG_MORE)?;

        while data.len() > BUF_SIZE {
            self.buf.extend_from_slice(&data[..BUF_SIZE]);
            data = &data[BUF_SIZE..];
            self.seal_pending(FLAG_MORE)?;
        }

        self.buf.extend_from_slice(data);
        Ok(())
    }
}

impl<W: Write> Write for SealWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.write_chunked(data).map_err(io::Error::other)?;
        Ok(data.len())
    }

    /// Pending plaintext stays buffered; only `finish` emits the last fragment.
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Read half of the stream.
///
/// Yields plaintext one authenticated fragment at a time. A fragment is
/// never released before its tag has been verified, but earlier fragments
/// may already have been read when a later one fails; callers that need
/// all-or-nothing semantics use [`OpenReader::read_all`].
pub struct OpenReader<R: Read> {
    inner: R,
    cipher: Box<dyn FragmentCipher>,
    nonces: NonceSequence,
    ad: [u8; 1 + TAG_LEN],
    frame: Zeroizing<Vec<u8>>,
    pos: usize,
    carry: Option<u8>,
    done: bool,
    poisoned: bool,
}

impl<R: Read> OpenReader<R> {
    pub fn new(
        inner: R,
        cipher: Box<dyn FragmentCipher>,
        nonce: &[u8; NONCE_LEN],
        ad: &[u8],
    ) -> Result<Self> {
        let mut nonces = NonceSequence::new(nonce);
        let ad = stream_ad(&*cipher, &mut nonces, ad)?;

        Ok(Self {
            inner,
            cipher,
            nonces,
            ad,
            frame: Zeroizing::new(Vec::with_capacity(BUF_SIZE + TAG_LEN + 1)),
            pos: 0,
            carry: None,
            done: false,
            poisoned: false,
        })
    }

    /// Reads and authenticates the whole stream.
    ///
    /// Nothing is returned unless every fragment, including the final one,
    /// verified.
    pub fn read_all(mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut out = Zeroizing::new(Vec::new());

        loop {
            if self.pos == self.frame.len() {
                if self.done {
                    return Ok(out);
                }
                self.next_fragment()?;
            }
            extend_wiped(&mut out, &self.frame[self.pos..]);
            self.pos = self.frame.len();
        }
    }

    fn next_fragment(&mut self) -> Result<()> {
        const FULL: usize = BUF_SIZE + TAG_LEN;

        self.frame.zeroize();
        self.pos = 0;
        if let Some(byte) = self.carry.take() {
            self.frame.push(byte);
        }

        // One byte past a full fragment tells whether another one follows.
        let mut chunk = [0u8; 4096];
        while self.frame.len() < FULL + 1 {
            let want = (FULL + 1 - self.frame.len()).min(chunk.len());
            match self.inner.read(&mut chunk[..want]) {
                Ok(0) => break,
                Ok(n) => self.frame.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        let flag = if self.frame.len() > FULL {
            self.carry = self.frame.pop();
            FLAG_MORE
        } else {
            if self.frame.len() < TAG_LEN {
                return Err(Error::MalformedInput("truncated fragment"));
            }
            self.done = true;
            FLAG_FINAL
        };

        let nonce = self.nonces.next()?;
        trace!("opening fragment of {} bytes (flag {flag:#04x})", self.frame.len());

        self.ad[0] = flag;
        if let Err(e) = self.cipher.open_fragment(&nonce, &self.ad, &mut self.frame) {
            self.frame.zeroize();
            return Err(e);
        }
        Ok(())
    }
}

impl<R: Read> Read for OpenReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.poisoned {
            return Err(io::Error::other(Error::AuthenticationFailure));
        }

        while self.pos == self.frame.len() {
            if self.done {
                return Ok(0);
            }
            if let Err(e) = self.next_fragment() {
                self.poisoned = true;
                return Err(io::Error::other(e));
            }
        }

        let n = out.len().min(self.frame.len() - self.pos);
        out[..n].copy_from_slice(&self.frame[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
