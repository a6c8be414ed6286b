use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use tiles2048::adapter::protocol::create_hello;
use tiles2048::adapter::server::{run_server, ServerConfig};
use tiles2048::adapter::{InboundCommand, OutboundMessage, PROTOCOL_VERSION};
use tiles2048::host::{Host, HostConfig};

async fn read_line(
    lines: &mut tokio::io::Lines<BufReader<tokio::net::tcp::OwnedReadHalf>>,
) -> serde_json::Value {
    let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timeout waiting for line")
        .expect("io error")
        .expect("expected line");
    serde_json::from_str(&line).unwrap()
}

async fn engine_loop(
    mut cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
) {
    let mut host = Host::new(HostConfig { seed: 42 });
    while let Some(inbound) = cmd_rx.recv().await {
        for msg in host.handle(inbound) {
            let _ = out_tx.send(msg);
        }
    }
}

#[tokio::test]
async fn closed_loop_moves_until_game_finished() {
    let config = ServerConfig {
        port: 0,
        max_pending_commands: 16,
        ..ServerConfig::default()
    };

    let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(16);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let server = tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await;
    });
    let engine = tokio::spawn(engine_loop(cmd_rx, out_tx));

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .unwrap()
        .unwrap();

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let hello = create_hello(1, "closed-loop", PROTOCOL_VERSION);
    write_half
        .write_all(serde_json::to_string(&hello).unwrap().as_bytes())
        .await
        .unwrap();
    write_half.write_all(b"\n").await.unwrap();
    write_half.flush().await.unwrap();

    assert_eq!(read_line(&mut lines).await["type"], "welcome");

    let mut obs = read_line(&mut lines).await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["seed"], 42);
    assert_eq!(obs["move_count"], 0);
    assert_eq!(obs["playable"], true);

    // Cycle directions one per command until the engine refuses a move.
    let dirs = ["left", "down", "right", "up"];
    let mut seq = 1u64;
    let mut finished = false;
    let mut last_score = 0u64;

    for i in 0..20_000usize {
        seq += 1;
        let cmd = format!(
            r#"{{"type":"command","seq":{},"ts":1,"actions":["{}"]}}"#,
            seq,
            dirs[i % dirs.len()]
        );
        write_half.write_all(cmd.as_bytes()).await.unwrap();
        write_half.write_all(b"\n").await.unwrap();
        write_half.flush().await.unwrap();

        // Observations broadcast after the previous ack arrive before this reply.
        let reply = loop {
            let v = read_line(&mut lines).await;
            if v["type"] != "observation" {
                break v;
            }
            let score = v["score"].as_u64().unwrap();
            assert!(score >= last_score);
            last_score = score;
            assert_eq!(v["last_event"]["changed"], true);
            assert_eq!(v["state_hash"].as_str().unwrap().len(), 16);
            obs = v;
        };

        assert_eq!(reply["seq"], seq);
        if reply["type"] == "error" {
            assert_eq!(reply["code"], "game_finished");
            assert!(obs["won"] == true || obs["game_over"] == true);
            assert_eq!(obs["playable"], false);
            finished = true;
            break;
        }
        assert_eq!(reply["type"], "ack");
    }
    assert!(finished);

    // Restart brings the game back.
    seq += 1;
    let restart = format!(r#"{{"type":"command","seq":{},"ts":1,"actions":["restart"]}}"#, seq);
    write_half.write_all(restart.as_bytes()).await.unwrap();
    write_half.write_all(b"\n").await.unwrap();
    write_half.flush().await.unwrap();

    assert_eq!(read_line(&mut lines).await["type"], "ack");
    let obs = read_line(&mut lines).await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["episode_id"], 1);
    assert_eq!(obs["move_count"], 0);
    assert_eq!(obs["playable"], true);

    server.abort();
    engine.abort();
}
