use romshelf_catalog::types::*;
use romshelf_db::*;
use rusqlite::Connection;

fn attach(conn: &Connection, game_id: i64, path: &str, hash: &str) -> FileLocation {
    insert_file_location(
        conn,
        game_id,
        &NewFileLocation {
            server_location: "nas".to_string(),
            file_path: path.to_string(),
            file_size: 512,
            file_hash: hash.to_string(),
        },
    )
    .unwrap()
}

#[test]
fn list_platforms_is_sorted_by_id() {
    let conn = open_memory().unwrap();
    let ids: Vec<String> = list_platforms(&conn)
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[test]
fn hashed_file_locations_skips_empty_hashes_and_orders_by_hash() {
    let conn = open_memory().unwrap();
    let game = insert_game(&conn, "Contra", "nes").unwrap();
    let b1 = attach(&conn, game.id, "/1.nes", "bbb");
    attach(&conn, game.id, "/2.nes", "");
    let a1 = attach(&conn, game.id, "/3.nes", "aaa");
    let b2 = attach(&conn, game.id, "/4.nes", "bbb");

    let ids: Vec<i64> = hashed_file_locations(&conn)
        .unwrap()
        .iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(ids, vec![a1.id, b1.id, b2.id]);
}

#[test]
fn file_locations_for_game_only_returns_that_game() {
    let conn = open_memory().unwrap();
    let contra = insert_game(&conn, "Contra", "nes").unwrap();
    let zelda = insert_game(&conn, "Zelda", "nes").unwrap();
    attach(&conn, contra.id, "/contra.nes", "c");
    attach(&conn, zelda.id, "/zelda.nes", "z");

    let files = file_locations_for_game(&conn, zelda.id).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_path, "/zelda.nes");
}

#[test]
fn games_missing_metadata_treats_blank_as_missing() {
    let conn = open_memory().unwrap();
    let complete = insert_game(&conn, "Complete", "snes").unwrap();
    let blank = insert_game(&conn, "Blank", "snes").unwrap();
    let no_cover = insert_game(&conn, "No Cover", "snes").unwrap();

    conn.execute(
        "UPDATE games SET description = 'd', cover_art_url = 'c' WHERE id = ?1",
        [complete.id],
    )
    .unwrap();
    conn.execute(
        "UPDATE games SET description = '', cover_art_url = '  ' WHERE id = ?1",
        [blank.id],
    )
    .unwrap();
    conn.execute(
        "UPDATE games SET description = 'd' WHERE id = ?1",
        [no_cover.id],
    )
    .unwrap();

    assert_eq!(
        games_missing_metadata(&conn).unwrap(),
        vec![blank.id, no_cover.id]
    );
}

#[test]
fn stats_count_everything() {
    let conn = open_memory().unwrap();
    let game = insert_game(&conn, "Contra", "nes").unwrap();
    attach(&conn, game.id, "/a.nes", "aaa");
    attach(&conn, game.id, "/b.nes", "");

    let stats = catalog_stats(&conn).unwrap();
    assert_eq!(stats.platforms as usize, romshelf_catalog::DEFAULT_PLATFORMS.len());
    assert_eq!(stats.games, 1);
    assert_eq!(stats.file_locations, 2);
    assert_eq!(stats.unhashed_files, 1);
    assert_eq!(stats.games_missing_metadata, 1);
}
