//! Versioned binary codec for pack descriptors and pack lists.
//!
//! Layout (all fixed integers little-endian):
//!
//! ```text
//! pack := version:varuint
//!         handle_start:i64
//!         handle_end:i64
//!         is_delete_range:u8
//!         n_cols:u64
//!         col[0..n_cols]
//!
//! col  := col_id:i64  page_id:u64  rows:u64  bytes:u64
//!         type_name_len:u64  type_name:bytes
//!         has_minmax:u8  minmax?
//! ```
//!
//! Columns are written in insertion order and must round-trip in that order;
//! readers address columns by id, but the descriptor bytes are compared
//! bit-for-bit by snapshot tooling. The one-byte `has_minmax` slot is written
//! for every column even though only the handle column carries an index
//! today; the slack is what keeps the format forward-compatible.

use crate::pack::{ColumnMeta, Pack};
use dmerge_result::{Error, Result};

use dmerge_data_types::codec::{
    get_bytes, get_i64_le, get_u8, get_u64_le, get_varuint, put_i64_le, put_u8, put_u64_le,
    put_varuint,
};
use dmerge_data_types::{DataType, MinMaxIndex};
use std::sync::Arc;

impl Pack {
    /// Serialize this pack's descriptor into `out`.
    pub fn serialize(&self, out: &mut Vec<u8>) -> Result<()> {
        put_varuint(out, Pack::CURRENT_VERSION);

        let (handle_start, handle_end) = self.handle_first_last();
        put_i64_le(out, handle_start);
        put_i64_le(out, handle_end);
        put_u8(out, self.is_delete_range() as u8);
        put_u64_le(out, self.metas().len() as u64);
        for (col_id, meta) in self.metas() {
            put_i64_le(out, *col_id);
            put_u64_le(out, meta.page_id);
            put_u64_le(out, meta.rows);
            put_u64_le(out, meta.bytes);
            let type_name = meta.data_type.name();
            put_u64_le(out, type_name.len() as u64);
            out.extend_from_slice(type_name.as_bytes());
            match &meta.minmax {
                Some(minmax) => {
                    put_u8(out, 1);
                    minmax.write(meta.data_type.as_ref(), out)?;
                }
                None => put_u8(out, 0),
            }
        }
        Ok(())
    }

    /// Decode one descriptor starting at `pos`.
    ///
    /// Fails with [`Error::FormatVersion`] on a version this build does not
    /// speak, and with [`Error::RowsMismatch`] when a column meta disagrees
    /// with the row count established by the first column.
    pub fn deserialize(buf: &[u8], pos: &mut usize) -> Result<Pack> {
        let version = get_varuint(buf, pos)?;
        if version != Pack::CURRENT_VERSION {
            return Err(Error::FormatVersion(version));
        }

        let handle_start = get_i64_le(buf, pos)?;
        let handle_end = get_i64_le(buf, pos)?;
        let is_delete_range = get_u8(buf, pos)? != 0;
        let mut pack = if is_delete_range {
            Pack::new_delete_range(handle_start, handle_end)
        } else {
            Pack::new(handle_start, handle_end)
        };

        let n_cols = get_u64_le(buf, pos)?;
        for _ in 0..n_cols {
            let col_id = get_i64_le(buf, pos)?;
            let page_id = get_u64_le(buf, pos)?;
            let rows = get_u64_le(buf, pos)?;
            let bytes = get_u64_le(buf, pos)?;
            let name_len = get_u64_le(buf, pos)? as usize;
            let name_bytes = get_bytes(buf, pos, name_len)?;
            let type_name = std::str::from_utf8(name_bytes).map_err(Error::corrupted)?;
            let data_type = Arc::new(DataType::from_name(type_name)?);
            let minmax = if get_u8(buf, pos)? != 0 {
                Some(Arc::new(MinMaxIndex::read(data_type.as_ref(), buf, pos)?))
            } else {
                None
            };
            pack.insert(ColumnMeta {
                col_id,
                page_id,
                rows,
                bytes,
                data_type,
                minmax,
            })?;
        }
        Ok(pack)
    }
}

/// Serialize a contiguous run of packs, optionally followed by trailing
/// extras (an in-flight pack, or the packs a commit log appends atomically).
pub fn serialize_packs(out: &mut Vec<u8>, packs: &[Pack], extras: &[&Pack]) -> Result<()> {
    put_u64_le(out, (packs.len() + extras.len()) as u64);
    for pack in packs {
        pack.serialize(out)?;
    }
    for pack in extras {
        pack.serialize(out)?;
    }
    Ok(())
}

/// Inverse of [`serialize_packs`]. The codec imposes no framing beyond the
/// leading count; callers sandwich it inside their own manifest.
pub fn deserialize_packs(buf: &[u8], pos: &mut usize) -> Result<Vec<Pack>> {
    let count = get_u64_le(buf, pos)?;
    let mut packs = Vec::with_capacity(count.min(1 << 20) as usize);
    for _ in 0..count {
        packs.push(Pack::deserialize(buf, pos)?);
    }
    Ok(packs)
}
