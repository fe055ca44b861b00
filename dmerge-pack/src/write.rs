//! Write path: column pages, pack assembly, and the ref-pack factory.

use crate::block::Block;
use crate::constants::EXTRA_HANDLE_COLUMN_ID;
use crate::context::DmContext;
use crate::pack::{ColumnMeta, Pack};
use dmerge_data_types::{
    Column, CompressionMethod, DataType, MinMaxIndex, compress_frame,
};
use dmerge_result::{Error, Result};
use dmerge_storage::{Pager, WriteBatch};
use std::sync::Arc;
use tracing::trace;

/// Serialize rows `[offset, offset + num)` of one column into a page buffer.
///
/// The window is streamed through the type's bulk multi-stream encoder and
/// wrapped in the compressed frame; `compress = false` still produces a
/// framed (pass-through) payload so the read path stays uniform. Returns the
/// buffer and its byte count, which becomes [`ColumnMeta::bytes`].
pub fn serialize_column(
    column: &Column,
    data_type: &DataType,
    offset: usize,
    num: usize,
    compress: bool,
) -> Result<(Vec<u8>, u64)> {
    let mut plain = Vec::new();
    data_type.serialize_bulk(column, offset, num, &mut plain)?;
    let method = if compress {
        CompressionMethod::Lz4
    } else {
        CompressionMethod::None
    };
    let frame = compress_frame(method, &plain);
    let bytes = frame.len() as u64;
    Ok((frame, bytes))
}

/// Assemble a pack from a row block sorted by handle.
///
/// Every store column is written as one page into `wb` under a freshly
/// allocated page id; the handle column additionally gets a min/max index.
/// The returned pack is ready for descriptor serialization once the batch is
/// committed.
pub fn prepare_pack_write<P: Pager>(
    ctx: &DmContext,
    pager: &P,
    wb: &mut WriteBatch,
    block: &Block,
) -> Result<Pack> {
    let handle_col = block
        .get_by_name(&ctx.handle_column.name)
        .ok_or_else(|| {
            Error::SchemaMismatch(format!(
                "handle column {} not found in block",
                ctx.handle_column.name
            ))
        })?;
    let handles = match &handle_col.column {
        Column::Int64(v) => v,
        other => {
            return Err(Error::SchemaMismatch(format!(
                "handle column has type {}, expected Int64",
                other.data_type().name()
            )));
        }
    };
    let (first, last) = match (handles.first(), handles.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(Error::SchemaMismatch(
                "cannot build a pack from an empty block".to_string(),
            ));
        }
    };

    let mut pack = Pack::new(first, last);
    let page_ids = pager.alloc_many(ctx.store_columns.len())?;
    for (col_define, page_id) in ctx.store_columns.iter().zip(page_ids) {
        let col = block.get_by_name(&col_define.name).ok_or_else(|| {
            Error::SchemaMismatch(format!("store column {} not found in block", col_define.name))
        })?;
        let compress = !ctx.not_compress.contains(&col_define.id);
        let rows = col.column.len();
        let (buf, bytes) = serialize_column(&col.column, &col_define.data_type, 0, rows, compress)?;

        let minmax = if col_define.id == EXTRA_HANDLE_COLUMN_ID {
            // Only index the handle column for now.
            Some(Arc::new(MinMaxIndex::build(
                &col_define.data_type,
                &col.column,
            )?))
        } else {
            None
        };

        wb.put_page(page_id, buf);
        pack.insert(ColumnMeta {
            col_id: col_define.id,
            page_id,
            rows: rows as u64,
            bytes,
            data_type: Arc::new(col_define.data_type.clone()),
            minmax,
        })?;
    }

    trace!(
        handle_start = first,
        handle_end = last,
        rows = pack.rows(),
        columns = pack.metas().len(),
        "pack assembled"
    );
    Ok(pack)
}

/// Produce a twin of `pack` whose columns point at the same underlying data
/// through page-store reference pages under fresh page ids.
///
/// This is the single place where column pages become shared; higher layers
/// never create ref pages for column data themselves.
pub fn create_ref_pack<P: Pager>(pack: &Pack, pager: &P, wb: &mut WriteBatch) -> Result<Pack> {
    if pack.is_delete_range() {
        return Ok(pack.clone());
    }

    let (handle_first, handle_end) = pack.handle_first_last();
    let mut ref_pack = Pack::new(handle_first, handle_end);
    let page_ids = pager.alloc_many(pack.metas().len())?;
    for ((col_id, meta), page_id) in pack.metas().iter().zip(page_ids) {
        wb.put_ref_page(page_id, meta.page_id);
        ref_pack.insert(ColumnMeta {
            col_id: *col_id,
            page_id,
            rows: meta.rows,
            bytes: meta.bytes,
            data_type: Arc::clone(&meta.data_type),
            minmax: meta.minmax.clone(),
        })?;
    }
    Ok(ref_pack)
}

/// [`create_ref_pack`] over a run of packs.
pub fn create_ref_packs<P: Pager>(
    packs: &[Pack],
    pager: &P,
    wb: &mut WriteBatch,
) -> Result<Vec<Pack>> {
    let mut ref_packs = Vec::with_capacity(packs.len());
    for pack in packs {
        ref_packs.push(create_ref_pack(pack, pager, wb)?);
    }
    Ok(ref_packs)
}
