use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use super::*;
use crate::types::NamedRef;

fn game(id: u64, platforms: &[&str]) -> IgdbGame {
    IgdbGame {
        id,
        platforms: platforms
            .iter()
            .map(|name| NamedRef {
                id: 0,
                name: name.to_string(),
            })
            .collect(),
        ..Default::default()
    }
}

#[test]
fn filter_keeps_games_on_matching_platform() {
    let games = vec![
        game(1, &["Nintendo Entertainment System"]),
        game(2, &["Super Nintendo Entertainment System"]),
        game(3, &["PC (Microsoft Windows)", "Nintendo Entertainment System"]),
        game(4, &[]),
    ];

    let ids: Vec<u64> = filter_by_platform(games, "NES")
        .iter()
        .map(|g| g.id)
        .collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn filter_with_unknown_platform_name_uses_substring() {
    let games = vec![game(1, &["Atari Jaguar"]), game(2, &["Atari Lynx"])];
    let ids: Vec<u64> = filter_by_platform(games, "jaguar")
        .iter()
        .map(|g| g.id)
        .collect();
    assert_eq!(ids, vec![1]);
}

#[test]
fn truncate_respects_char_boundaries() {
    let long = "é".repeat(300);
    assert_eq!(truncate(&long).chars().count(), 200);
    assert_eq!(truncate("short"), "short");
}

#[test]
fn parses_games_payload() {
    let json = r#"[
        {"id": 1074, "name": "Super Mario 64", "total_rating": 91.2,
         "first_release_date": 835142400,
         "genres": [{"id": 8, "name": "Platform"}],
         "platforms": [{"id": 4, "name": "Nintendo 64"}],
         "cover": {"id": 1, "url": "//images.igdb.com/igdb/image/upload/t_thumb/co6cl7.jpg"}},
        {"id": 99}
    ]"#;
    let games: Vec<IgdbGame> = serde_json::from_str(json).unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].genres[0].name, "Platform");
    assert!(games[1].cover.is_none());

    let envelope = to_envelope(&games[0]);
    assert_eq!(envelope.rating, Some(9.1));
    assert_eq!(envelope.year, Some(1996));
}

const TOKEN_OK: &str = r#"{"access_token":"t1","expires_in":3600,"token_type":"bearer"}"#;
const TOKEN_OK_2: &str = r#"{"access_token":"t2","expires_in":3600,"token_type":"bearer"}"#;
const ONE_GAME: &str = r#"[{"id": 1074, "name": "Super Mario 64",
    "platforms": [{"id": 4, "name": "Nintendo 64"}]}]"#;

type Reply = (u16, &'static str);

#[derive(Debug)]
struct Seen {
    path: String,
    body: String,
}

#[derive(Default)]
struct Replies {
    token: VecDeque<Reply>,
    games: VecDeque<Reply>,
}

/// A one-request-per-connection HTTP/1.1 server answering `/token` and
/// `/games` from canned queues.
struct CannedServer {
    addr: SocketAddr,
    seen: Arc<StdMutex<Vec<Seen>>>,
}

impl CannedServer {
    async fn start(token: Vec<Reply>, games: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let replies = Arc::new(StdMutex::new(Replies {
            token: token.into(),
            games: games.into(),
        }));

        let log = seen.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                answer(stream, &replies, &log).await;
            }
        });
        Self { addr, seen }
    }

    fn client(&self) -> IgdbClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        IgdbClient::with_http(
            IgdbCredentials {
                client_id: "client".to_string(),
                client_secret: "secret".to_string(),
                token_url: format!("http://{}/token", self.addr),
                api_url: format!("http://{}", self.addr),
            },
            http,
        )
    }

    fn hits(&self, path: &str) -> usize {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.path == path)
            .count()
    }

    fn games_bodies(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.path == "/games")
            .map(|s| s.body.clone())
            .collect()
    }
}

async fn answer(mut stream: TcpStream, replies: &StdMutex<Replies>, seen: &StdMutex<Vec<Seen>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let target = head.split_whitespace().nth(1).unwrap_or("/");
    let path = target.split('?').next().unwrap_or(target).to_string();
    let body = String::from_utf8_lossy(&buf[header_end..]).into_owned();

    let (status, reply) = {
        let mut replies = replies.lock().unwrap();
        let queue = if path == "/token" {
            &mut replies.token
        } else {
            &mut replies.games
        };
        queue.pop_front().unwrap_or((500, "no canned reply left"))
    };
    seen.lock().unwrap().push(Seen { path, body });

    let response = format!(
        "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{reply}",
        reply.len()
    );
    stream.write_all(response.as_bytes()).await.unwrap();
    let _ = stream.shutdown().await;
}

#[tokio::test]
async fn rejected_token_is_refreshed_once_then_fatal() {
    let server = CannedServer::start(
        vec![(200, TOKEN_OK), (200, TOKEN_OK_2)],
        vec![(401, ""), (401, "")],
    )
    .await;

    let err = server
        .client()
        .search_games("Super Mario 64", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Auth(_)), "got {err:?}");
    assert!(err.is_fatal());
    assert_eq!(server.hits("/token"), 2);
    assert_eq!(server.hits("/games"), 2);
}

#[tokio::test]
async fn rejected_token_recovers_after_refresh() {
    let server = CannedServer::start(
        vec![(200, TOKEN_OK), (200, TOKEN_OK_2)],
        vec![(401, ""), (200, ONE_GAME)],
    )
    .await;

    let games = server
        .client()
        .search_games("Super Mario 64", None)
        .await
        .unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].id, 1074);
    assert_eq!(server.hits("/token"), 2);
}

#[tokio::test]
async fn forbidden_is_auth_error() {
    let server = CannedServer::start(vec![(200, TOKEN_OK)], vec![(403, "")]).await;
    let err = server.client().search_games("Zelda", None).await.unwrap_err();
    assert!(matches!(err, ProviderError::Auth(_)), "got {err:?}");
    assert_eq!(server.hits("/games"), 1);
}

#[tokio::test]
async fn too_many_requests_is_rate_limit() {
    let server = CannedServer::start(vec![(200, TOKEN_OK)], vec![(429, "")]).await;
    let err = server.client().search_games("Zelda", None).await.unwrap_err();
    assert!(matches!(err, ProviderError::RateLimit), "got {err:?}");
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn server_failure_is_not_fatal() {
    let server = CannedServer::start(vec![(200, TOKEN_OK)], vec![(500, "upstream down")]).await;
    let err = server.client().search_games("Zelda", None).await.unwrap_err();
    match &err {
        ProviderError::ServerError { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "upstream down");
        }
        other => panic!("expected ServerError, got {other:?}"),
    }
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn empty_result_is_no_match() {
    let server = CannedServer::start(vec![(200, TOKEN_OK)], vec![(200, "[]")]).await;
    let envelopes = server
        .client()
        .search("Nonexistent Game", Some("snes"))
        .await
        .unwrap();
    assert!(envelopes.is_empty());
}

#[tokio::test]
async fn known_platform_is_scoped_server_side() {
    let server = CannedServer::start(vec![(200, TOKEN_OK)], vec![(200, "[]")]).await;
    server
        .client()
        .search_games("Zelda", Some("Super Nintendo Entertainment System"))
        .await
        .unwrap();

    let bodies = server.games_bodies();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].contains("where platforms = (19);"), "{}", bodies[0]);
    assert!(bodies[0].ends_with("limit 10;"), "{}", bodies[0]);
}

#[tokio::test]
async fn unknown_platform_is_filtered_client_side() {
    let payload = r#"[
        {"id": 1, "name": "Alien vs Predator", "platforms": [{"id": 62, "name": "Atari Jaguar"}]},
        {"id": 2, "name": "Chip's Challenge", "platforms": [{"id": 61, "name": "Atari Lynx"}]}
    ]"#;
    let server = CannedServer::start(vec![(200, TOKEN_OK)], vec![(200, payload)]).await;
    let games = server
        .client()
        .search_games("Alien", Some("Atari Jaguar"))
        .await
        .unwrap();

    let ids: Vec<u64> = games.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![1]);
    let bodies = server.games_bodies();
    assert!(!bodies[0].contains("where"), "{}", bodies[0]);
    assert!(bodies[0].ends_with("limit 50;"), "{}", bodies[0]);
}

#[tokio::test]
async fn token_endpoint_rejection_is_fatal() {
    let server = CannedServer::start(vec![(400, r#"{"message":"invalid client secret"}"#)], vec![])
        .await;
    let err = server.client().search_games("Zelda", None).await.unwrap_err();
    assert!(matches!(err, ProviderError::Auth(_)), "got {err:?}");
    assert!(err.is_fatal());
    assert_eq!(server.hits("/games"), 0);
}
