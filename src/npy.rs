//src/npy.rs

//! NumPy `.npy` (format 1.0) encoding for `f64` images.
//!
//! Layout: the magic `\x93NUMPY`, version bytes `1 0`, a little-endian `u16`
//! header length, then an ASCII dict padded with spaces and a trailing `\n`
//! so the payload starts on a 64-byte boundary. The payload is the array in
//! C order as little-endian `f64`.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use ndarray::Array2;

use crate::error::{Read2ArrayError, Result};
use crate::types::Image;

pub const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Magic, two version bytes and the header length field.
const PREAMBLE_LEN: usize = NPY_MAGIC.len() + 2 + 2;
const ALIGNMENT: usize = 64;

fn header_dict(rows: usize, cols: usize) -> String {
    let mut header = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({rows}, {cols}), }}"
    );
    let unpadded = PREAMBLE_LEN + header.len() + 1;
    let padding = (ALIGNMENT - unpadded % ALIGNMENT) % ALIGNMENT;
    header.extend(std::iter::repeat(' ').take(padding));
    header.push('\n');
    header
}

/// Writes `image` as a complete `.npy` file to `w`.
pub fn write_npy<W: Write>(mut w: W, image: &Image) -> std::io::Result<()> {
    let (rows, cols) = image.dim();
    let header = header_dict(rows, cols);

    w.write_all(NPY_MAGIC)?;
    w.write_all(&[1, 0])?;
    w.write_u16::<LittleEndian>(header.len() as u16)?;
    w.write_all(header.as_bytes())?;
    // `iter` walks logical order, which is C order for any memory layout.
    for &v in image.iter() {
        w.write_f64::<LittleEndian>(v)?;
    }
    w.flush()
}

/// Parses a `.npy` stream holding a 2-D little-endian `f64` array in C order.
pub fn read_npy<R: Read>(mut r: R) -> Result<Image> {
    let truncated = |e: std::io::Error| Read2ArrayError::Npy(format!("truncated stream: {e}"));

    let mut magic = [0u8; 6];
    r.read_exact(&mut magic).map_err(truncated)?;
    if &magic != NPY_MAGIC {
        return Err(Read2ArrayError::Npy("missing NUMPY magic".to_string()));
    }

    let major = r.read_u8().map_err(truncated)?;
    let _minor = r.read_u8().map_err(truncated)?;
    let header_len = match major {
        1 => r.read_u16::<LittleEndian>().map_err(truncated)? as usize,
        2 | 3 => r.read_u32::<LittleEndian>().map_err(truncated)? as usize,
        v => return Err(Read2ArrayError::Npy(format!("unsupported version {v}"))),
    };

    let mut header = vec![0u8; header_len];
    r.read_exact(&mut header).map_err(truncated)?;
    let header = String::from_utf8(header)
        .map_err(|_| Read2ArrayError::Npy("header is not text".to_string()))?;

    if !header.contains("'descr': '<f8'") {
        return Err(Read2ArrayError::Npy(format!("unsupported dtype in {header:?}")));
    }
    if !header.contains("'fortran_order': False") {
        return Err(Read2ArrayError::Npy("fortran order is not supported".to_string()));
    }
    let (rows, cols) = parse_shape(&header)?;

    let mut data = vec![0f64; rows * cols];
    r.read_f64_into::<LittleEndian>(&mut data).map_err(truncated)?;

    Array2::from_shape_vec((rows, cols), data).map_err(|e| Read2ArrayError::Npy(e.to_string()))
}

fn parse_shape(header: &str) -> Result<(usize, usize)> {
    let bad_shape = || Read2ArrayError::Npy(format!("cannot read 2-D shape from {header:?}"));

    let start = header.find("'shape': (").ok_or_else(bad_shape)? + "'shape': (".len();
    let end = header[start..].find(')').ok_or_else(bad_shape)? + start;
    let dims = header[start..end]
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| d.parse::<usize>().map_err(|_| bad_shape()))
        .collect::<Result<Vec<usize>>>()?;

    match dims.as_slice() {
        [rows, cols] => Ok((*rows, *cols)),
        _ => Err(bad_shape()),
    }
}

/// Loads a `.npy` file from disk.
pub fn load_npy<P: AsRef<Path>>(path: P) -> Result<Image> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| Read2ArrayError::io(path, e))?;
    read_npy(BufReader::new(f))
}
