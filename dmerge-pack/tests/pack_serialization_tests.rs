use dmerge_data_types::codec::{put_i64_le, put_u8, put_u64_le, put_varuint};
use dmerge_data_types::{Column, DataType, Value};
use dmerge_pack::block::{Block, ColumnWithTypeAndName};
use dmerge_pack::constants::{EXTRA_HANDLE_COLUMN_ID, EXTRA_HANDLE_COLUMN_NAME};
use dmerge_pack::serialization::{deserialize_packs, serialize_packs};
use dmerge_pack::{ColumnDefine, DmContext, Pack, prepare_pack_write};
use dmerge_result::Error;
use dmerge_storage::{MemPager, WriteBatch};
use rand::Rng;

fn handle_define() -> ColumnDefine {
    ColumnDefine::new(EXTRA_HANDLE_COLUMN_ID, EXTRA_HANDLE_COLUMN_NAME, DataType::Int64)
}

fn string_column(values: &[&str]) -> Column {
    let mut col = DataType::String.create_column();
    for v in values {
        col.push(&Value::String(v.to_string())).unwrap();
    }
    col
}

/// The block and context of end-to-end scenario "three rows, three columns".
fn three_row_block() -> (DmContext, Block) {
    let defines = vec![
        handle_define(),
        ColumnDefine::new(2, "v", DataType::Int32),
        ColumnDefine::new(3, "s", DataType::String),
    ];
    let mut block = Block::default();
    block.insert(ColumnWithTypeAndName {
        column: Column::Int64(vec![10, 11, 12]),
        data_type: DataType::Int64,
        name: EXTRA_HANDLE_COLUMN_NAME.to_string(),
        column_id: EXTRA_HANDLE_COLUMN_ID,
    });
    block.insert(ColumnWithTypeAndName {
        column: Column::Int32(vec![100, -1, 7]),
        data_type: DataType::Int32,
        name: "v".to_string(),
        column_id: 2,
    });
    block.insert(ColumnWithTypeAndName {
        column: string_column(&["a", "bb", "ccc"]),
        data_type: DataType::String,
        name: "s".to_string(),
        column_id: 3,
    });
    (DmContext::new(handle_define(), defines), block)
}

fn build_pack() -> Pack {
    let pager = MemPager::new();
    let mut wb = WriteBatch::new();
    let (ctx, block) = three_row_block();
    prepare_pack_write(&ctx, &pager, &mut wb, &block).unwrap()
}

fn roundtrip(pack: &Pack) -> Pack {
    let mut buf = Vec::new();
    pack.serialize(&mut buf).unwrap();
    let mut pos = 0;
    let back = Pack::deserialize(&buf, &mut pos).unwrap();
    assert_eq!(pos, buf.len());
    back
}

#[test]
fn built_pack_matches_expectations() {
    let pack = build_pack();
    assert_eq!(pack.rows(), 3);
    assert_eq!(pack.handle_first_last(), (10, 12));
    assert!(!pack.is_delete_range());

    let handle_meta = pack.get_column(EXTRA_HANDLE_COLUMN_ID).unwrap();
    let minmax = handle_meta.minmax.as_ref().expect("handle column is indexed");
    assert_eq!(minmax.min(), Value::Int64(10));
    assert_eq!(minmax.max(), Value::Int64(12));

    // Only the handle column carries an index.
    assert!(pack.get_column(2).unwrap().minmax.is_none());
    assert!(pack.get_column(3).unwrap().minmax.is_none());
}

#[test]
fn descriptor_roundtrip_preserves_everything() {
    let pack = build_pack();
    let back = roundtrip(&pack);
    assert_eq!(back, pack);
    // Column order is part of the contract, not just the id set.
    let ids: Vec<_> = back.metas().iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![EXTRA_HANDLE_COLUMN_ID, 2, 3]);

    // Bit-exactness: a second serialization of the decoded pack is identical.
    let mut first = Vec::new();
    pack.serialize(&mut first).unwrap();
    let mut second = Vec::new();
    back.serialize(&mut second).unwrap();
    assert_eq!(first, second);
}

#[test]
fn delete_range_pack_roundtrip() {
    let pack = Pack::new_delete_range(100, 200);
    let back = roundtrip(&pack);
    assert!(back.is_delete_range());
    assert_eq!(back.delete_range(), (100, 200));
    assert_eq!(back.rows(), 0);
    assert!(back.metas().is_empty());
}

#[test]
fn unknown_version_is_rejected() {
    let pack = build_pack();
    let mut buf = Vec::new();
    pack.serialize(&mut buf).unwrap();
    // The version varuint is the first byte while versions stay below 128.
    assert_eq!(buf[0], 1);
    buf[0] = 2;
    let err = Pack::deserialize(&buf, &mut 0).unwrap_err();
    assert!(matches!(err, Error::FormatVersion(2)));
}

/// Hand-craft a two-column descriptor advertising the given row counts.
fn craft_two_column_descriptor(rows_first: u64, rows_second: u64) -> Vec<u8> {
    let mut buf = Vec::new();
    put_varuint(&mut buf, 1);
    put_i64_le(&mut buf, 0); // handle_start
    put_i64_le(&mut buf, 99); // handle_end
    put_u8(&mut buf, 0); // is_delete_range
    put_u64_le(&mut buf, 2); // n_cols
    for (col_id, rows) in [(1i64, rows_first), (2, rows_second)] {
        put_i64_le(&mut buf, col_id);
        put_u64_le(&mut buf, 1000 + col_id as u64); // page_id
        put_u64_le(&mut buf, rows);
        put_u64_le(&mut buf, 128); // bytes
        let name = "Int64";
        put_u64_le(&mut buf, name.len() as u64);
        buf.extend_from_slice(name.as_bytes());
        put_u8(&mut buf, 0); // has_minmax
    }
    buf
}

#[test]
fn row_count_disagreement_is_rejected() {
    let buf = craft_two_column_descriptor(16, 17);
    let err = Pack::deserialize(&buf, &mut 0).unwrap_err();
    assert!(matches!(
        err,
        Error::RowsMismatch {
            expected: 16,
            got: 17
        }
    ));
}

#[test]
fn zero_row_count_disagreement_is_rejected() {
    // Zero is a real row count, not an "unset" marker: a 0-row column
    // followed by a 16-row column must fail, and the other way around too.
    let err = Pack::deserialize(&craft_two_column_descriptor(0, 16), &mut 0).unwrap_err();
    assert!(matches!(err, Error::RowsMismatch { expected: 0, got: 16 }));

    let err = Pack::deserialize(&craft_two_column_descriptor(16, 0), &mut 0).unwrap_err();
    assert!(matches!(err, Error::RowsMismatch { expected: 16, got: 0 }));

    let pack = Pack::deserialize(&craft_two_column_descriptor(0, 0), &mut 0).unwrap();
    assert_eq!(pack.rows(), 0);
    assert_eq!(pack.metas().len(), 2);
}

#[test]
fn truncated_descriptor_is_corruption() {
    let pack = build_pack();
    let mut buf = Vec::new();
    pack.serialize(&mut buf).unwrap();
    for cut in [1, 10, buf.len() - 1] {
        let err = Pack::deserialize(&buf[..cut], &mut 0).unwrap_err();
        assert!(matches!(err, Error::Corrupted(_)), "cut at {cut}: {err}");
    }
}

#[test]
fn pack_list_roundtrip_with_extras() {
    let a = build_pack();
    let b = Pack::new_delete_range(20, 30);
    let c = build_pack();
    let d = Pack::new_delete_range(40, 50);

    let mut buf = Vec::new();
    serialize_packs(&mut buf, &[a.clone(), b.clone()], &[&c, &d]).unwrap();
    let mut pos = 0;
    let packs = deserialize_packs(&buf, &mut pos).unwrap();
    assert_eq!(pos, buf.len());
    assert_eq!(packs, vec![a, b, c, d]);
}

#[test]
fn empty_pack_list_roundtrip() {
    let mut buf = Vec::new();
    serialize_packs(&mut buf, &[], &[]).unwrap();
    let packs = deserialize_packs(&buf, &mut 0).unwrap();
    assert!(packs.is_empty());
}

#[test]
fn randomized_descriptor_roundtrip() {
    let mut rng = rand::rng();
    let type_pool = [
        DataType::Int8,
        DataType::Int16,
        DataType::Int32,
        DataType::Int64,
        DataType::UInt8,
        DataType::UInt16,
        DataType::UInt32,
        DataType::UInt64,
        DataType::String,
        DataType::nullable(DataType::Int64),
        DataType::nullable(DataType::String),
    ];
    for _ in 0..64 {
        let start: i64 = rng.random_range(-1_000_000..1_000_000);
        let end = start + rng.random_range(0..1_000_000);
        let mut pack = Pack::new(start, end);
        let rows = rng.random_range(1..10_000u64);
        let n_cols = rng.random_range(1..8usize);
        for c in 0..n_cols {
            let data_type = type_pool[rng.random_range(0..type_pool.len())].clone();
            pack.insert(dmerge_pack::ColumnMeta {
                col_id: c as i64,
                page_id: rng.random(),
                rows,
                bytes: rng.random_range(0..1 << 30),
                data_type: std::sync::Arc::new(data_type),
                minmax: None,
            })
            .unwrap();
        }
        assert_eq!(roundtrip(&pack), pack);
    }
}
