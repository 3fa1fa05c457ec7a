//! Etag computation.
//!
//! Non-multipart etags are the hex MD5 of the body. Multipart etags are the
//! hex MD5 of the concatenated raw part digests with a `-<part_count>`
//! suffix. Etags are stored and returned unquoted; quoting is the
//! frontend's concern.

use std::io;

use digest::Digest;
use md5::Md5;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Hex MD5 of an empty body, the etag of every directory-object.
pub const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";

/// Copy buffer size for staged writes and range reads.
pub(crate) const COPY_BUF_SIZE: usize = 64 * 1024;

/// Compute the hex MD5 digest of a byte slice.
///
/// # Examples
///
/// ```
/// use fsgate_posix::checksums::compute_md5;
///
/// assert_eq!(compute_md5(b"hello"), "5d41402abc4b2a76b9719d911017c592");
/// ```
#[must_use]
pub fn compute_md5(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Stream `reader` into `writer`, accumulating an MD5 over the copied
/// bytes. Returns the byte count and the hex digest.
pub async fn copy_with_md5<R, W>(reader: &mut R, writer: &mut W) -> io::Result<(u64, String)>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut total = 0u64;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        writer.write_all(&buf[..n]).await?;
        total += n as u64;
    }

    Ok((total, hex::encode(hasher.finalize())))
}

/// Compute the composite multipart etag from the parts' hex MD5 digests:
/// `hex(MD5(concat(raw digests))) + "-" + part_count`.
///
/// Quotes around individual digests are tolerated and stripped.
///
/// # Examples
///
/// ```
/// use fsgate_posix::checksums::{compute_md5, multipart_etag};
///
/// let etag = multipart_etag(&[compute_md5(b"a"), compute_md5(b"b")]);
/// assert!(etag.ends_with("-2"));
/// ```
#[must_use]
pub fn multipart_etag(part_md5_hexes: &[impl AsRef<str>]) -> String {
    let mut combined = Vec::with_capacity(part_md5_hexes.len() * 16);
    for part in part_md5_hexes {
        if let Ok(bytes) = hex::decode(part.as_ref().trim_matches('"')) {
            combined.extend_from_slice(&bytes);
        }
    }
    let digest = hex::encode(Md5::digest(&combined));
    format!("{digest}-{}", part_md5_hexes.len())
}
