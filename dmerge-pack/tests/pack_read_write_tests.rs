use dmerge_data_types::{Column, DataType, Value};
use dmerge_pack::block::{Block, ColumnWithTypeAndName};
use dmerge_pack::constants::{EXTRA_HANDLE_COLUMN_ID, EXTRA_HANDLE_COLUMN_NAME};
use dmerge_pack::{
    ColumnDefine, DmContext, Pack, prepare_pack_write, read_pack, read_pack_data,
};
use dmerge_result::Error;
use dmerge_storage::{InstrumentedPager, MemPager, PageReader, Pager, WriteBatch};
use rand::Rng;

fn handle_define() -> ColumnDefine {
    ColumnDefine::new(EXTRA_HANDLE_COLUMN_ID, EXTRA_HANDLE_COLUMN_NAME, DataType::Int64)
}

fn column_of(data_type: &DataType, values: &[Value]) -> Column {
    let mut col = data_type.create_column();
    for v in values {
        col.push(v).unwrap();
    }
    col
}

fn block_from(columns: Vec<(ColumnDefine, Column)>) -> Block {
    let mut block = Block::default();
    for (define, column) in columns {
        block.insert(ColumnWithTypeAndName {
            column,
            data_type: define.data_type.clone(),
            name: define.name.clone(),
            column_id: define.id,
        });
    }
    block
}

/// Write one pack of `(handle, v:Int32, s:String)` and commit the batch.
fn write_standard_pack<P: Pager>(pager: &P) -> (Pack, Vec<ColumnDefine>) {
    let defines = vec![
        handle_define(),
        ColumnDefine::new(2, "v", DataType::Int32),
        ColumnDefine::new(3, "s", DataType::String),
    ];
    let ctx = DmContext::new(handle_define(), defines.clone());
    let block = block_from(vec![
        (
            defines[0].clone(),
            Column::Int64(vec![10, 11, 12]),
        ),
        (
            defines[1].clone(),
            Column::Int32(vec![100, -1, 7]),
        ),
        (
            defines[2].clone(),
            column_of(
                &DataType::String,
                &[
                    Value::String("a".into()),
                    Value::String("bb".into()),
                    Value::String("ccc".into()),
                ],
            ),
        ),
    ]);
    let mut wb = WriteBatch::new();
    let pack = prepare_pack_write(&ctx, pager, &mut wb, &block).unwrap();
    pager.commit(wb).unwrap();
    (pack, defines)
}

fn column_values(column: &Column) -> Vec<Value> {
    (0..column.len()).map(|i| column.value_at(i)).collect()
}

#[test]
fn write_read_roundtrip() {
    let pager = MemPager::new();
    let (pack, defines) = write_standard_pack(&pager);

    let reader = PageReader::new(&pager);
    let block = read_pack(&pack, &defines, &reader).unwrap();
    assert_eq!(block.rows(), 3);
    assert_eq!(
        column_values(&block.columns()[0].column),
        vec![Value::Int64(10), Value::Int64(11), Value::Int64(12)]
    );
    assert_eq!(
        column_values(&block.columns()[1].column),
        vec![Value::Int64(100), Value::Int64(-1), Value::Int64(7)]
    );
    assert_eq!(
        column_values(&block.columns()[2].column),
        vec![
            Value::String("a".into()),
            Value::String("bb".into()),
            Value::String("ccc".into())
        ]
    );
}

#[test]
fn uncompressed_columns_read_back_the_same() {
    let pager = MemPager::new();
    let defines = vec![handle_define(), ColumnDefine::new(2, "v", DataType::UInt64)];
    let mut ctx = DmContext::new(handle_define(), defines.clone());
    ctx.not_compress.insert(2);
    let block = block_from(vec![
        (defines[0].clone(), Column::Int64(vec![1, 2])),
        (defines[1].clone(), Column::UInt64(vec![u64::MAX, 0])),
    ]);
    let mut wb = WriteBatch::new();
    let pack = prepare_pack_write(&ctx, &pager, &mut wb, &block).unwrap();
    pager.commit(wb).unwrap();

    let reader = PageReader::new(&pager);
    let out = read_pack(&pack, &defines, &reader).unwrap();
    assert_eq!(
        column_values(&out.columns()[1].column),
        vec![Value::UInt64(u64::MAX), Value::UInt64(0)]
    );
}

#[test]
fn missing_column_fills_default_without_page_reads() {
    let pager = InstrumentedPager::new(MemPager::new());
    let (pack, mut defines) = write_standard_pack(&pager);
    let stats = pager.stats();
    stats.reset();

    // Columns added by DDL after the pack was written.
    defines.push(
        ColumnDefine::new(4, "w", DataType::String).with_default(Value::String("x".into())),
    );
    defines.push(ColumnDefine::new(5, "n", DataType::UInt64));

    let reader = PageReader::new(&pager);
    let block = read_pack(&pack, &defines, &reader).unwrap();
    assert_eq!(
        column_values(&block.columns()[3].column),
        vec![
            Value::String("x".into()),
            Value::String("x".into()),
            Value::String("x".into())
        ]
    );
    // A define without a declared default falls back to the type default.
    assert_eq!(
        column_values(&block.columns()[4].column),
        vec![Value::UInt64(0), Value::UInt64(0), Value::UInt64(0)]
    );

    // Only the three on-disk columns hit the page store.
    assert_eq!(stats.snapshot().physical_gets, 3);
}

#[test]
fn empty_define_list_reads_nothing() {
    let pager = InstrumentedPager::new(MemPager::new());
    let (pack, _) = write_standard_pack(&pager);
    let stats = pager.stats();
    stats.reset();

    let reader = PageReader::new(&pager);
    let block = read_pack(&pack, &[], &reader).unwrap();
    assert!(block.is_empty());
    assert_eq!(block.rows(), 0);
    assert_eq!(stats.snapshot().physical_gets, 0);
    assert_eq!(stats.snapshot().get_batches, 0);
}

#[test]
fn zero_row_pack_reads_as_empty_columns() {
    let pager = MemPager::new();
    let pack = Pack::new(0, 0);
    assert_eq!(pack.rows(), 0);
    assert!(!pack.is_delete_range());

    let defines = vec![handle_define()];
    let reader = PageReader::new(&pager);
    let block = read_pack(&pack, &defines, &reader).unwrap();
    assert_eq!(block.columns().len(), 1);
    assert_eq!(block.rows(), 0);
}

#[test]
fn window_reads_compose() {
    let pager = MemPager::new();
    let mut rng = rand::rng();
    let rows = 257usize;
    let handles: Vec<i64> = (0..rows as i64).collect();
    let values: Vec<Value> = (0..rows).map(|_| Value::UInt64(rng.random())).collect();
    let strings: Vec<Value> = (0..rows)
        .map(|i| Value::String(format!("row-{i}-{}", rng.random_range(0..1000))))
        .collect();

    let defines = vec![
        handle_define(),
        ColumnDefine::new(2, "v", DataType::UInt64),
        ColumnDefine::new(3, "s", DataType::String),
    ];
    let ctx = DmContext::new(handle_define(), defines.clone());
    let block = block_from(vec![
        (defines[0].clone(), Column::Int64(handles)),
        (defines[1].clone(), column_of(&DataType::UInt64, &values)),
        (defines[2].clone(), column_of(&DataType::String, &strings)),
    ]);
    let mut wb = WriteBatch::new();
    let pack = prepare_pack_write(&ctx, &pager, &mut wb, &block).unwrap();
    pager.commit(wb).unwrap();

    let reader = PageReader::new(&pager);
    let full = read_pack(&pack, &defines, &reader).unwrap();

    for k in [0usize, 1, 128, 256, rows] {
        let mut columns: Vec<Column> = defines.iter().map(|d| d.data_type.create_column()).collect();
        read_pack_data(&mut columns, &defines, &pack, &reader, 0, k).unwrap();
        read_pack_data(&mut columns, &defines, &pack, &reader, k, rows - k).unwrap();
        for (read, expected) in columns.iter().zip(full.columns()) {
            assert_eq!(read, &expected.column, "split at {k}");
        }
    }
}

#[test]
fn freed_pages_surface_as_storage_unavailable() {
    let pager = MemPager::new();
    let (pack, defines) = write_standard_pack(&pager);
    let page_ids: Vec<_> = pack.metas().iter().map(|(_, m)| m.page_id).collect();
    pager.free_many(&page_ids).unwrap();

    let reader = PageReader::new(&pager);
    let err = read_pack(&pack, &defines, &reader).unwrap_err();
    assert!(matches!(err, Error::StorageUnavailable(_)));
}

#[test]
fn unknown_handle_column_is_a_schema_mismatch() {
    let pager = MemPager::new();
    let ctx = DmContext::new(handle_define(), vec![handle_define()]);
    let block = block_from(vec![(
        ColumnDefine::new(9, "something_else", DataType::Int64),
        Column::Int64(vec![1]),
    )]);
    let mut wb = WriteBatch::new();
    let err = prepare_pack_write(&ctx, &pager, &mut wb, &block).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch(_)));
}

#[test]
fn empty_block_cannot_become_a_pack() {
    let pager = MemPager::new();
    let ctx = DmContext::new(handle_define(), vec![handle_define()]);
    let block = block_from(vec![(handle_define(), Column::Int64(vec![]))]);
    let mut wb = WriteBatch::new();
    let err = prepare_pack_write(&ctx, &pager, &mut wb, &block).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch(_)));
}
