//! Read path: materialize a subset of a pack's columns into destination
//! columns, honoring a `(rows_offset, rows_limit)` window.

use crate::block::{Block, ColumnDefine, ColumnWithTypeAndName};
use crate::cast::{cast_column, is_supported_cast};
use crate::pack::{ColumnMeta, Pack};
use dmerge_data_types::{Column, decompress_frame};
use dmerge_result::{Error, Result};
use dmerge_storage::{PageId, PageReader, Pager};
use rustc_hash::FxHashMap;
use tracing::trace;

/// Decode the first `rows_limit` rows of a column page into `column`.
fn deserialize_column(
    column: &mut Column,
    meta: &ColumnMeta,
    page_data: &[u8],
    rows_limit: usize,
) -> Result<()> {
    let raw = decompress_frame(page_data)?;
    let avg_value_size_hint = if meta.rows == 0 {
        0.0
    } else {
        page_data.len() as f64 / meta.rows as f64
    };
    meta.data_type.deserialize_bulk(
        column,
        rows_limit,
        meta.rows as usize,
        avg_value_size_hint,
        &raw,
        &mut 0,
    )
}

/// Read rows `[rows_offset, rows_offset + rows_limit)` of the requested
/// columns into `columns` (one destination per entry of `column_defines`).
///
/// Columns missing from the pack were added by DDL after the pack was
/// written; they are filled from their default value without touching the
/// page store. Columns whose on-disk type differs from the requested type go
/// through the schema-evolution cast engine.
pub fn read_pack_data<P: Pager>(
    columns: &mut [Column],
    column_defines: &[ColumnDefine],
    pack: &Pack,
    page_reader: &PageReader<'_, P>,
    rows_offset: usize,
    rows_limit: usize,
) -> Result<()> {
    debug_assert!(!pack.is_delete_range());
    debug_assert!(rows_offset + rows_limit <= pack.rows() as usize);
    debug_assert_eq!(columns.len(), column_defines.len());

    let mut page_to_index: FxHashMap<PageId, usize> = FxHashMap::default();
    let mut page_ids: Vec<PageId> = Vec::with_capacity(column_defines.len());
    for (index, define) in column_defines.iter().enumerate() {
        if let Some(meta) = pack.get_column(define.id) {
            page_ids.push(meta.page_id);
            page_to_index.insert(meta.page_id, index);
        } else {
            // New column after DDL does not exist in the pack's meta; fill it
            // with the define's default value, never with page reads.
            let value = if define.default_value.is_null() {
                define.data_type.default_value()
            } else {
                define.default_value.clone()
            };
            let filled = define.data_type.create_column_const(rows_limit, &value)?;
            columns[index].insert_range_from(&filled, 0, rows_limit)?;
        }
    }

    page_reader.read(&page_ids, |page| {
        let index = *page_to_index
            .get(&page.page_id)
            .ok_or_else(|| Error::corrupted(format!("unexpected page {}", page.page_id)))?;
        let read_define = &column_defines[index];
        let col = &mut columns[index];
        let disk_meta = pack
            .get_column(read_define.id)
            .ok_or_else(|| Error::corrupted(format!("column {} vanished from pack", read_define.id)))?;

        // read_define.data_type is the current type in memory; the meta's is
        // the type on disk, which may lag behind DDL.
        if *disk_meta.data_type == read_define.data_type {
            if rows_offset == 0 {
                deserialize_column(col, disk_meta, page.data.as_ref(), rows_limit)
            } else {
                let mut tmp_col = read_define.data_type.create_column();
                deserialize_column(&mut tmp_col, disk_meta, page.data.as_ref(), rows_offset + rows_limit)?;
                col.insert_range_from(&tmp_col, rows_offset, rows_limit)
            }
        } else {
            let (first, last) = pack.handle_first_last();
            trace!(
                handle_start = first,
                handle_end = last,
                column = %read_define.name,
                disk_type = %disk_meta.data_type.name(),
                read_type = %read_define.data_type.name(),
                "reading pack column with mismatched data type"
            );
            if !is_supported_cast(&disk_meta.data_type, &read_define.data_type) {
                return Err(Error::CastUnsupported {
                    from: disk_meta.data_type.name(),
                    to: read_define.data_type.name(),
                });
            }

            // Read from disk according to the pack's meta, then cast into
            // what the reader declared.
            let mut disk_col = disk_meta.data_type.create_column();
            deserialize_column(&mut disk_col, disk_meta, page.data.as_ref(), rows_offset + rows_limit)?;
            cast_column(
                &disk_meta.data_type,
                &disk_col,
                read_define,
                col,
                rows_offset,
                rows_limit,
            )
        }
    })
}

/// Materialize the requested columns of a whole pack as a block.
///
/// An empty define list yields an empty block and no page-store traffic; a
/// zero-row pack yields a block of empty columns.
pub fn read_pack<P: Pager>(
    pack: &Pack,
    read_column_defines: &[ColumnDefine],
    page_reader: &PageReader<'_, P>,
) -> Result<Block> {
    if read_column_defines.is_empty() {
        return Ok(Block::default());
    }

    let mut columns: Vec<Column> = read_column_defines
        .iter()
        .map(|define| {
            let mut column = define.data_type.create_column();
            column.reserve(pack.rows() as usize);
            column
        })
        .collect();

    if pack.rows() > 0 {
        read_pack_data(
            &mut columns,
            read_column_defines,
            pack,
            page_reader,
            0,
            pack.rows() as usize,
        )?;
    }

    let mut block = Block::default();
    for (define, column) in read_column_defines.iter().zip(columns) {
        block.insert(ColumnWithTypeAndName {
            column,
            data_type: define.data_type.clone(),
            name: define.name.clone(),
            column_id: define.id,
        });
    }
    Ok(block)
}
