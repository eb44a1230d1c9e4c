//! PartitionStore interface tests.
//!
//! These tests verify the contract of the PartitionStore trait against a
//! live SQL connection. Every test works in its own list so they can share
//! one database.

use ordinals::config::{OrderedColumn, OrderingConfig};
use ordinals::{
    OrderingDriver, PartitionStore, PositionRange, Reindexer, ScopeKey, ScopeValue, Shift,
};
use sqlx::{Connection, SqliteConnection};

use super::{expect, insert_item, list_layout, load_item, seed_list, set_position};

fn position() -> OrderedColumn {
    OrderedColumn::new("position").scoped_by("list_id")
}

fn reindexer() -> Reindexer {
    Reindexer::new("items", "id")
}

fn list(id: i64) -> ScopeKey {
    ScopeKey::new(vec![ScopeValue::Int(id)])
}

// =============================================================================
// Raw shifts
// =============================================================================

pub async fn test_shift_returns_rows_affected(conn: &mut SqliteConnection) {
    seed_list(conn, Some(1), &["A", "B", "C"]).await;

    let rows = conn
        .shift(&Shift {
            table: "items".into(),
            column: "position".into(),
            scope: vec![("list_id".into(), ScopeValue::Int(1))],
            range: PositionRange::between(2, 3),
            delta: 1,
            exclude: None,
        })
        .await
        .expect("shift should succeed");

    assert_eq!(rows, 2, "B and C should move");
    assert_eq!(
        list_layout(conn, Some(1)).await,
        expect(&[("A", 1), ("B", 3), ("C", 4)])
    );
}

pub async fn test_text_scope_is_bound(conn: &mut SqliteConnection) {
    for (name, kind, pos) in [("A", "bug", 1), ("B", "bug", 2), ("C", "o'brien", 1)] {
        sqlx::query("INSERT INTO items (name, list_id, kind, position) VALUES (?, 2, ?, ?)")
            .bind(name)
            .bind(kind)
            .bind(pos as i64)
            .execute(&mut *conn)
            .await
            .unwrap();
    }

    let rows = conn
        .shift(&Shift {
            table: "items".into(),
            column: "position".into(),
            scope: vec![
                ("list_id".into(), ScopeValue::Int(2)),
                ("kind".into(), ScopeValue::Text("o'brien".into())),
            ],
            range: PositionRange::starting_at(1),
            delta: 1,
            exclude: None,
        })
        .await
        .expect("shift should succeed");

    assert_eq!(rows, 1, "only the o'brien row matches");
}

// =============================================================================
// Reindexer operations
// =============================================================================

pub async fn test_insert_makes_room(conn: &mut SqliteConnection) {
    seed_list(conn, Some(3), &["A", "B", "C"]).await;

    reindexer()
        .on_insert(conn, &position(), &list(3), Some(2), None)
        .await
        .unwrap();
    insert_item(conn, "D", Some(3), Some(2)).await;

    assert_eq!(
        list_layout(conn, Some(3)).await,
        expect(&[("A", 1), ("D", 2), ("B", 3), ("C", 4)])
    );
}

pub async fn test_remove_excludes_leaving_row(conn: &mut SqliteConnection) {
    let ids = seed_list(conn, Some(4), &["A", "B", "C", "D"]).await;
    let c = ScopeValue::Int(ids[2]);

    reindexer()
        .on_remove(conn, &position(), &list(4), Some(3), Some(&c))
        .await
        .unwrap();
    assert_eq!(
        list_layout(conn, Some(4)).await,
        expect(&[("A", 1), ("B", 2), ("C", 3), ("D", 3)]),
        "the leaving row keeps its slot until it is deleted"
    );

    sqlx::query("DELETE FROM items WHERE id = ?")
        .bind(ids[2])
        .execute(&mut *conn)
        .await
        .unwrap();

    assert_eq!(
        list_layout(conn, Some(4)).await,
        expect(&[("A", 1), ("B", 2), ("D", 3)])
    );
}

pub async fn test_move_later_and_earlier(conn: &mut SqliteConnection) {
    let ids = seed_list(conn, Some(5), &["A", "B", "C", "D"]).await;
    let r = reindexer();

    r.on_update(conn, &position(), &list(5), Some(1), Some(3), Some(&ScopeValue::Int(ids[0])))
        .await
        .unwrap();
    set_position(conn, ids[0], Some(3)).await;
    assert_eq!(
        list_layout(conn, Some(5)).await,
        expect(&[("B", 1), ("C", 2), ("A", 3), ("D", 4)])
    );

    r.on_update(conn, &position(), &list(5), Some(4), Some(1), Some(&ScopeValue::Int(ids[3])))
        .await
        .unwrap();
    set_position(conn, ids[3], Some(1)).await;
    assert_eq!(
        list_layout(conn, Some(5)).await,
        expect(&[("D", 1), ("B", 2), ("C", 3), ("A", 4)])
    );
}

pub async fn test_null_scope_partition(conn: &mut SqliteConnection) {
    seed_list(conn, None, &["A", "B"]).await;
    seed_list(conn, Some(6), &["X", "Y"]).await;

    reindexer()
        .on_insert(conn, &position(), &ScopeKey::new(vec![ScopeValue::Null]), Some(1), None)
        .await
        .unwrap();

    assert_eq!(list_layout(conn, None).await, expect(&[("A", 2), ("B", 3)]));
    assert_eq!(
        list_layout(conn, Some(6)).await,
        expect(&[("X", 1), ("Y", 2)])
    );
}

// =============================================================================
// Transactions
// =============================================================================

pub async fn test_rollback_discards_shift(conn: &mut SqliteConnection) {
    seed_list(conn, Some(7), &["A", "B"]).await;

    let mut tx = conn.begin().await.unwrap();
    reindexer()
        .on_insert(&mut *tx, &position(), &list(7), Some(1), None)
        .await
        .unwrap();
    tx.rollback().await.unwrap();

    assert_eq!(
        list_layout(conn, Some(7)).await,
        expect(&[("A", 1), ("B", 2)])
    );
}

pub async fn test_driver_lifecycle_in_transactions(conn: &mut SqliteConnection) {
    let driver = OrderingDriver::new(OrderingConfig::new("items").with_column(position())).unwrap();
    let ids = seed_list(conn, Some(8), &["A", "B", "C"]).await;

    // insert
    let mut tx = conn.begin().await.unwrap();
    let new = ordinals::RecordSnapshot::new()
        .with("list_id", 8i64)
        .with("position", 1i64);
    driver.before_insert(&mut *tx, &new).await.unwrap();
    let d = insert_item(&mut tx, "D", Some(8), Some(1)).await;
    tx.commit().await.unwrap();
    assert_eq!(
        list_layout(conn, Some(8)).await,
        expect(&[("D", 1), ("A", 2), ("B", 3), ("C", 4)])
    );

    // move
    let mut tx = conn.begin().await.unwrap();
    let old = load_item(&mut tx, d).await;
    let mut new = old.clone();
    new.set("position", 4i64);
    driver.before_update(&mut *tx, &old, &new).await.unwrap();
    set_position(&mut tx, d, Some(4)).await;
    tx.commit().await.unwrap();
    assert_eq!(
        list_layout(conn, Some(8)).await,
        expect(&[("A", 1), ("B", 2), ("C", 3), ("D", 4)])
    );

    // remove
    let mut tx = conn.begin().await.unwrap();
    let old = load_item(&mut tx, ids[0]).await;
    driver.before_remove(&mut *tx, &old).await.unwrap();
    sqlx::query("DELETE FROM items WHERE id = ?")
        .bind(ids[0])
        .execute(&mut *tx)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    assert_eq!(
        list_layout(conn, Some(8)).await,
        expect(&[("B", 1), ("C", 2), ("D", 3)])
    );
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all PartitionStore interface tests against a connection.
#[macro_export]
macro_rules! run_partition_store_tests {
    ($conn:expr) => {
        use $crate::storage::partition_store_tests::*;

        // raw shifts
        test_shift_returns_rows_affected($conn).await;
        println!("  test_shift_returns_rows_affected: PASSED");

        test_text_scope_is_bound($conn).await;
        println!("  test_text_scope_is_bound: PASSED");

        // reindexer operations
        test_insert_makes_room($conn).await;
        println!("  test_insert_makes_room: PASSED");

        test_remove_excludes_leaving_row($conn).await;
        println!("  test_remove_excludes_leaving_row: PASSED");

        test_move_later_and_earlier($conn).await;
        println!("  test_move_later_and_earlier: PASSED");

        test_null_scope_partition($conn).await;
        println!("  test_null_scope_partition: PASSED");

        // transactions
        test_rollback_discards_shift($conn).await;
        println!("  test_rollback_discards_shift: PASSED");

        test_driver_lifecycle_in_transactions($conn).await;
        println!("  test_driver_lifecycle_in_transactions: PASSED");
    };
}
