//! Binary (de)serialization of gate tables: `T3GATES\0` magic + 4-byte
//! version + little-endian int8 rows, per the persisted layout.

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::trit::Trit;

use super::tables::{DYADIC_GATE_COUNT, MONADIC_GATE_COUNT};

pub const MAGIC: &[u8; 8] = b"T3GATES\0";
pub const VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum GateIoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("bad magic bytes")]
    BadMagic,
    #[error("unsupported table version {0}")]
    UnsupportedVersion(u32),
    #[error("table contains an invalid trit byte {0}")]
    InvalidTrit(i8),
}

/// Write a dyadic and monadic table pair in the persisted layout.
pub fn write_table<W: Write>(
    writer: &mut W,
    dyadic: &[[Trit; 9]],
    monadic: &[[Trit; 3]],
) -> Result<(), GateIoError> {
    writer.write_all(MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    for row in dyadic {
        for &trit in row {
            writer.write_all(&[trit.to_i8() as u8])?;
        }
    }
    for row in monadic {
        for &trit in row {
            writer.write_all(&[trit.to_i8() as u8])?;
        }
    }
    Ok(())
}

/// Read a dyadic/monadic table pair previously written by [`write_table`].
pub fn read_table<R: Read>(reader: &mut R) -> Result<(Vec<[Trit; 9]>, Vec<[Trit; 3]>), GateIoError> {
    let mut magic = [0u8; 8];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(GateIoError::BadMagic);
    }

    let mut version_bytes = [0u8; 4];
    reader.read_exact(&mut version_bytes)?;
    let version = u32::from_le_bytes(version_bytes);
    if version != VERSION {
        return Err(GateIoError::UnsupportedVersion(version));
    }

    let mut dyadic = Vec::with_capacity(DYADIC_GATE_COUNT);
    for _ in 0..DYADIC_GATE_COUNT {
        dyadic.push(read_row::<_, 9>(reader)?);
    }

    let mut monadic = Vec::with_capacity(MONADIC_GATE_COUNT);
    for _ in 0..MONADIC_GATE_COUNT {
        monadic.push(read_row::<_, 3>(reader)?);
    }

    Ok((dyadic, monadic))
}

fn read_row<R: Read, const N: usize>(reader: &mut R) -> Result<[Trit; N], GateIoError> {
    let mut bytes = [0u8; N];
    reader.read_exact(&mut bytes)?;
    let mut row = [Trit::Zero; N];
    for (slot, byte) in row.iter_mut().zip(bytes.iter()) {
        let value = *byte as i8;
        *slot = Trit::from_i8(value).ok_or(GateIoError::InvalidTrit(value))?;
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::tables::GateTable;

    #[test]
    fn round_trips_through_a_buffer() {
        let table = GateTable::standard();
        let dyadic: Vec<[Trit; 9]> = (0..DYADIC_GATE_COUNT as u32)
            .map(|id| *table.dyadic_row(id).unwrap())
            .collect();
        let monadic: Vec<[Trit; 3]> = (0..MONADIC_GATE_COUNT as u32)
            .map(|id| *table.monadic_row(id).unwrap())
            .collect();

        let mut buffer = Vec::new();
        write_table(&mut buffer, &dyadic, &monadic).unwrap();

        let (read_dyadic, read_monadic) = read_table(&mut &buffer[..]).unwrap();
        assert_eq!(read_dyadic, dyadic);
        assert_eq!(read_monadic, monadic);
    }

    #[test]
    fn rejects_bad_magic() {
        let buffer = vec![0u8; 12];
        assert!(matches!(read_table(&mut &buffer[..]), Err(GateIoError::BadMagic)));
    }
}
