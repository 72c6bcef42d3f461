//! Concurrent writers on a multi-connection file database, the way `serve`
//! runs.  Every structural change and position batch must commit, each one
//! bumping the board version exactly once.

use std::future::Future;

use engine::{ListPositionUpdate, PositionBase, PositionBatch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{boards, cards, fixtures::file_pool_with_board, lists, positions};
use crate::{DbError, DbPool};

const CONNECTIONS: u32 = 10;

fn spawn_write<F, Fut>(pool: &DbPool, write: F) -> JoinHandle<Result<(), DbError>>
where
    F: FnOnce(DbPool) -> Fut,
    Fut: Future<Output = Result<(), DbError>> + Send + 'static,
{
    tokio::spawn(write(pool.clone()))
}

async fn join_all(handles: Vec<JoinHandle<Result<(), DbError>>>) {
    for handle in handles {
        handle.await.expect("task panicked").expect("write failed");
    }
}

fn swap_batch(
    board_id: Uuid,
    first: Uuid,
    second: Uuid,
    flipped: bool,
) -> PositionBatch<ListPositionUpdate> {
    let (a, b) = if flipped { (2, 1) } else { (1, 2) };
    PositionBatch::new(
        board_id,
        None,
        vec![
            ListPositionUpdate { id: first, position: a, board_id },
            ListPositionUpdate { id: second, position: b, board_id },
        ],
    )
}

async fn card_positions(pool: &DbPool, list_id: Uuid) -> Vec<i32> {
    cards::cards_for_list(pool, list_id)
        .await
        .unwrap()
        .iter()
        .map(|c| c.position)
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_card_creates_all_commit_with_distinct_positions() {
    let dir = tempfile::tempdir().unwrap();
    let (pool, _, board_id) = file_pool_with_board(dir.path(), CONNECTIONS).await;
    let base = PositionBase::default();
    let list_id = lists::create_list(&pool, board_id, "Todo", base).await.unwrap().id;
    let before = boards::get_board(&pool, board_id).await.unwrap().version;

    let handles = (0..20)
        .map(|i| {
            spawn_write(&pool, move |pool| async move {
                cards::create_card(&pool, board_id, list_id, &format!("card {i}"), base).await?;
                Ok(())
            })
        })
        .collect();
    join_all(handles).await;

    assert_eq!(card_positions(&pool, list_id).await, (1..=20).collect::<Vec<_>>());
    assert_eq!(boards::get_board(&pool, board_id).await.unwrap().version, before + 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn copies_and_creates_race_a_position_batch_without_failures() {
    let dir = tempfile::tempdir().unwrap();
    let (pool, _, board_id) = file_pool_with_board(dir.path(), CONNECTIONS).await;
    let base = PositionBase::default();
    let todo = lists::create_list(&pool, board_id, "Todo", base).await.unwrap().id;
    let done = lists::create_list(&pool, board_id, "Done", base).await.unwrap().id;
    let seed = cards::create_card(&pool, board_id, todo, "seed", base).await.unwrap().id;
    let before = boards::get_board(&pool, board_id).await.unwrap().version;

    let mut handles = Vec::new();
    for i in 0..5 {
        handles.push(spawn_write(&pool, move |pool| async move {
            lists::create_list(&pool, board_id, &format!("list {i}"), base).await?;
            Ok(())
        }));
        handles.push(spawn_write(&pool, move |pool| async move {
            lists::copy_list(&pool, todo, board_id, base).await?;
            Ok(())
        }));
        handles.push(spawn_write(&pool, move |pool| async move {
            cards::create_card(&pool, board_id, done, &format!("card {i}"), base).await?;
            Ok(())
        }));
        handles.push(spawn_write(&pool, move |pool| async move {
            cards::copy_card(&pool, seed, board_id, base).await?;
            Ok(())
        }));
        handles.push(spawn_write(&pool, move |pool| async move {
            let batch = swap_batch(board_id, todo, done, i % 2 == 0);
            positions::apply_list_positions(&pool, &batch).await?;
            Ok(())
        }));
    }
    join_all(handles).await;

    // The two swapped lists keep 1 and 2; ten created or copied lists follow.
    let mut listed: Vec<i32> = lists::lists_for_board(&pool, board_id)
        .await
        .unwrap()
        .iter()
        .map(|l| l.position)
        .collect();
    listed.sort_unstable();
    assert_eq!(listed, (1..=12).collect::<Vec<_>>());

    assert_eq!(card_positions(&pool, done).await, (1..=5).collect::<Vec<_>>());
    assert_eq!(card_positions(&pool, todo).await, (1..=6).collect::<Vec<_>>());
    assert_eq!(boards::get_board(&pool, board_id).await.unwrap().version, before + 25);
}
