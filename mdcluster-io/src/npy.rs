//! Minimal codec for NumPy `.npy` files, version 1.0, little endian.
//!
//! Point data must be 32-bit floats; integer arrays are accepted in any of
//! the common NumPy widths (`np.save` of a Python int list produces
//! `<i8`). Fortran-ordered files are rejected.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::errors::ArrayIoError;

const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Element types this codec understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DType {
    F32,
    I32,
    U32,
    I64,
    U64,
}

impl DType {
    fn from_descr(descr: &str) -> Option<DType> {
        match descr {
            "<f4" => Some(DType::F32),
            "<i4" => Some(DType::I32),
            "<u4" => Some(DType::U32),
            "<i8" => Some(DType::I64),
            "<u8" => Some(DType::U64),
            _ => None,
        }
    }

    fn descr(&self) -> &'static str {
        match self {
            DType::F32 => "<f4",
            DType::I32 => "<i4",
            DType::U32 => "<u4",
            DType::I64 => "<i8",
            DType::U64 => "<u8",
        }
    }
}

struct Header {
    dtype: DType,
    shape: Vec<usize>,
}

fn bad_header(path: &str, reason: &str) -> ArrayIoError {
    ArrayIoError::BadHeader { path: path.to_string(), reason: reason.to_string() }
}

/// Extracts the value following `key` in the header dictionary.
fn dict_value<'a>(dict: &'a str, key: &str) -> Option<&'a str> {
    let start = dict.find(key)? + key.len();
    let rest = dict[start..].trim_start().strip_prefix(':')?.trim_start();
    Some(rest)
}

fn read_header<R: Read>(reader: &mut R, path: &str) -> Result<Header, ArrayIoError> {
    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(bad_header(path, "bad magic string"));
    }

    let major = reader.read_u8()?;
    let minor = reader.read_u8()?;
    if (major, minor) != (1, 0) {
        return Err(bad_header(path, &format!("unsupported format version {}.{}", major, minor)));
    }

    let header_len = reader.read_u16::<LittleEndian>()? as usize;
    let mut header_bytes = vec![0u8; header_len];
    reader.read_exact(&mut header_bytes)?;
    let dict = String::from_utf8(header_bytes)
        .map_err(|_| bad_header(path, "header is not valid UTF-8"))?;

    let descr = dict_value(&dict, "'descr'")
        .and_then(|rest| rest.strip_prefix('\''))
        .and_then(|rest| rest.split('\'').next())
        .ok_or_else(|| bad_header(path, "missing 'descr' entry"))?;
    let dtype = DType::from_descr(descr)
        .ok_or_else(|| ArrayIoError::DtypeMismatch {
            path: path.to_string(),
            found: descr.to_string(),
            expected: "<f4, <i4, <u4, <i8 or <u8".to_string(),
        })?;

    let fortran = dict_value(&dict, "'fortran_order'")
        .ok_or_else(|| bad_header(path, "missing 'fortran_order' entry"))?;
    if fortran.starts_with("True") {
        return Err(bad_header(path, "Fortran-ordered arrays are not supported"));
    }

    let shape_src = dict_value(&dict, "'shape'")
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.split(')').next())
        .ok_or_else(|| bad_header(path, "missing 'shape' entry"))?;
    let mut shape: Vec<usize> = Vec::new();
    for part in shape_src.split(',') {
        let part = part.trim();
        if part.is_empty() { continue; }
        let n: usize = part.parse()
            .map_err(|_| bad_header(path, "malformed 'shape' entry"))?;
        shape.push(n);
    }

    Ok(Header { dtype, shape })
}

/// Loads a file of 32-bit floats, returning its shape and the flat payload
/// in row-major order.
pub fn load_f32(path: &str) -> Result<(Vec<usize>, Vec<f32>), ArrayIoError> {
    let mut reader = BufReader::new(File::open(path)?);
    let header = read_header(&mut reader, path)?;
    if header.dtype != DType::F32 {
        return Err(ArrayIoError::DtypeMismatch {
            path: path.to_string(),
            found: header.dtype.descr().to_string(),
            expected: "<f4".to_string(),
        });
    }

    let count: usize = header.shape.iter().product();
    let mut values = vec![0.0f32; count];
    reader.read_f32_into::<LittleEndian>(&mut values)?;
    Ok((header.shape, values))
}

/// Loads an integer file of any supported width, widening the payload to
/// `i64`.
pub fn load_integers(path: &str) -> Result<(Vec<usize>, Vec<i64>), ArrayIoError> {
    let mut reader = BufReader::new(File::open(path)?);
    let header = read_header(&mut reader, path)?;

    let count: usize = header.shape.iter().product();
    let values: Vec<i64> = match header.dtype {
        DType::I32 => {
            let mut raw = vec![0i32; count];
            reader.read_i32_into::<LittleEndian>(&mut raw)?;
            raw.into_iter().map(|v| v as i64).collect()
        }
        DType::U32 => {
            let mut raw = vec![0u32; count];
            reader.read_u32_into::<LittleEndian>(&mut raw)?;
            raw.into_iter().map(|v| v as i64).collect()
        }
        DType::I64 => {
            let mut raw = vec![0i64; count];
            reader.read_i64_into::<LittleEndian>(&mut raw)?;
            raw
        }
        DType::U64 => {
            let mut raw = vec![0u64; count];
            reader.read_u64_into::<LittleEndian>(&mut raw)?;
            raw.into_iter().map(|v| v as i64).collect()
        }
        DType::F32 => {
            return Err(ArrayIoError::DtypeMismatch {
                path: path.to_string(),
                found: "<f4".to_string(),
                expected: "an integer dtype".to_string(),
            });
        }
    };
    Ok((header.shape, values))
}

fn format_shape(shape: &[usize]) -> String {
    if shape.len() == 1 {
        format!("({},)", shape[0])
    } else {
        let parts: Vec<String> = shape.iter().map(|n| n.to_string()).collect();
        format!("({})", parts.join(", "))
    }
}

fn write_header<W: Write>(writer: &mut W, descr: &str, shape: &[usize]) -> Result<(), ArrayIoError> {
    let mut dict = format!("{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}",
                           descr, format_shape(shape));

    // pad with spaces so the payload starts on a 64-byte boundary
    let unpadded = MAGIC.len() + 2 + 2 + dict.len() + 1;
    let padding = (64 - unpadded % 64) % 64;
    for _ in 0..padding { dict.push(' '); }
    dict.push('\n');

    writer.write_all(MAGIC)?;
    writer.write_u8(1)?;
    writer.write_u8(0)?;
    writer.write_u16::<LittleEndian>(dict.len() as u16)?;
    writer.write_all(dict.as_bytes())?;
    Ok(())
}

/// Saves an `f32` payload under an explicit row-major shape.
pub fn save_f32_shaped(path: &str, shape: &[usize], values: &[f32]) -> Result<(), ArrayIoError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_header(&mut writer, "<f4", shape)?;
    for &v in values { writer.write_f32::<LittleEndian>(v)?; }
    Ok(())
}

/// Saves a flat `f32` sequence as a 1-D `<f4` array.
pub fn save_f32(path: &str, values: &[f32]) -> Result<(), ArrayIoError> {
    save_f32_shaped(path, &[values.len()], values)
}

/// Saves a flat `u32` sequence as a 1-D `<u4` array.
pub fn save_u32(path: &str, values: &[u32]) -> Result<(), ArrayIoError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_header(&mut writer, "<u4", &[values.len()])?;
    for &v in values { writer.write_u32::<LittleEndian>(v)?; }
    Ok(())
}

/// Saves a flat `i32` sequence as a 1-D `<i4` array.
pub fn save_i32(path: &str, values: &[i32]) -> Result<(), ArrayIoError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_header(&mut writer, "<i4", &[values.len()])?;
    for &v in values { writer.write_i32::<LittleEndian>(v)?; }
    Ok(())
}
