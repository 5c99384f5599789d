use std::io::{Read, Write};

use anyhow::Result;
use integer_encoding::*;

// 3 is the zstd default
pub const ZSTD_COMPRESS_LEVEL: i32 = 3;

const ROUTE_DATA_MAGIC_HEADER: [u8; 2] = [b'R', b'0'];

// Upper bound for preallocation, a corrupted length should not be able to
// make us reserve gigabytes.
const MAX_PREALLOCATED_POINTS: u64 = 1 << 16;

pub fn validate_magic_header<T: Read>(reader: &mut T, expected_header: &[u8; 2]) -> Result<()> {
    let mut magic_header: [u8; 2] = [0; 2];
    reader.read_exact(&mut magic_header)?;
    if &magic_header != expected_header {
        bail!(
            "Invalid magic header, expect: {:?}, got: {:?}",
            expected_header,
            &magic_header
        );
    };
    Ok(())
}

/* Layout: magic header, then a zstd stream of
   varint(n) | n big endian f64 latitudes | n big endian f64 longitudes
*/
pub fn serialize_route_data<T: Write>(
    latitudes: &[f64],
    longitudes: &[f64],
    mut writer: T,
) -> Result<()> {
    if latitudes.len() != longitudes.len() {
        bail!(
            "Mismatched coordinate arrays: {} latitudes, {} longitudes",
            latitudes.len(),
            longitudes.len()
        );
    }
    writer.write_all(&ROUTE_DATA_MAGIC_HEADER)?;

    // data is compressed as a whole
    let mut encoder = zstd::Encoder::new(writer, ZSTD_COMPRESS_LEVEL)?;
    encoder.write_all(&(latitudes.len() as u64).encode_var_vec())?;
    for latitude in latitudes {
        encoder.write_all(&latitude.to_be_bytes())?;
    }
    for longitude in longitudes {
        encoder.write_all(&longitude.to_be_bytes())?;
    }
    encoder.finish()?;
    Ok(())
}

pub fn deserialize_route_data<T: Read>(mut reader: T) -> Result<(Vec<f64>, Vec<f64>)> {
    validate_magic_header(&mut reader, &ROUTE_DATA_MAGIC_HEADER)?;

    let mut decoder = zstd::Decoder::new(reader)?;
    let points_count: u64 = decoder.read_varint()?;
    let mut read_array = || -> Result<Vec<f64>> {
        let mut values = Vec::with_capacity(points_count.min(MAX_PREALLOCATED_POINTS) as usize);
        let mut buf: [u8; 8] = [0; 8];
        for _ in 0..points_count {
            decoder.read_exact(&mut buf)?;
            values.push(f64::from_be_bytes(buf));
        }
        Ok(values)
    };
    let latitudes = read_array()?;
    let longitudes = read_array()?;
    Ok((latitudes, longitudes))
}
