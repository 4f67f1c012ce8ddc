use comms::{
    msg::{Command, Msg, Payload},
    specs::group::GroupSpec,
};
use tokio::io;

#[tokio::test]
async fn send_recv_rows() {
    const SIZE: usize = 128;

    let rows: Vec<f32> = (0..40).map(|x| x as f32 * 0.5).collect();

    let (one, two) = io::duplex(SIZE);
    let (rx, tx) = io::split(one);
    let (_, mut tx) = comms::channel(rx, tx);

    let (rx2, tx2) = io::split(two);
    let (mut rx, _) = comms::channel(rx2, tx2);

    let expected = rows.clone();
    let send = async move { tx.send(&Msg::Data(Payload::Slab(&rows))).await };
    let recv = async move {
        let mut buf: Vec<u32> = Vec::new();
        match rx.recv_into(&mut buf).await? {
            Msg::Data(Payload::Slab(got)) => assert_eq!(got, expected.as_slice()),
            other => panic!("unexpected message {other:?}"),
        }
        Ok::<_, std::io::Error>(())
    };

    let (sent, received) = tokio::join!(send, recv);
    sent.unwrap();
    received.unwrap();
}

#[tokio::test]
async fn frames_arrive_in_order() {
    let (one, two) = io::duplex(4096);
    let (rx, tx) = io::split(one);
    let (_, mut tx) = comms::channel(rx, tx);
    let (rx2, tx2) = io::split(two);
    let (mut rx, _) = comms::channel(rx2, tx2);

    let spec = GroupSpec {
        rank: 1,
        workers: 2,
        rows: 4,
        cols: 4,
    };

    tx.send(&Msg::Control(Command::Assign(spec.clone())))
        .await
        .unwrap();
    tx.send(&Msg::Data(Payload::Interior(&[]))).await.unwrap();
    tx.send(&Msg::Err("boom".into())).await.unwrap();

    let mut buf: Vec<u32> = Vec::new();

    let Msg::Control(Command::Assign(got)) = rx.recv_into(&mut buf).await.unwrap() else {
        panic!("expected assign");
    };
    assert_eq!(got, spec);

    let Msg::Data(Payload::Interior(rows)) = rx.recv_into(&mut buf).await.unwrap() else {
        panic!("expected interior rows");
    };
    assert!(rows.is_empty());

    let Msg::Err(reason) = rx.recv_into(&mut buf).await.unwrap() else {
        panic!("expected error frame");
    };
    assert_eq!(reason, "boom");
}

#[tokio::test]
async fn closed_stream_is_an_error() {
    let (one, two) = io::duplex(64);
    drop(one);

    let (rx, tx) = io::split(two);
    let (mut rx, _) = comms::channel(rx, tx);

    let mut buf: Vec<u32> = Vec::new();
    assert!(rx.recv_into::<Msg, _>(&mut buf).await.is_err());
}

#[tokio::test]
async fn rows_larger_than_the_pipe_arrive_whole() {
    let rows: Vec<f32> = (0..1000).map(|x| x as f32).collect();

    let (one, two) = io::duplex(256);
    let (rx1, tx1) = io::split(one);
    let (_, mut tx) = comms::channel(rx1, tx1);
    let (rx2, tx2) = io::split(two);
    let (mut rx, _) = comms::channel(rx2, tx2);

    let expected = rows.clone();
    let send = async move {
        tx.send(&Msg::Data(Payload::Boundary(&rows))).await?;
        tx.send(&Msg::Control(Command::Barrier)).await
    };
    let recv = async move {
        let mut buf: Vec<u32> = Vec::new();
        match rx.recv_into(&mut buf).await? {
            Msg::Data(Payload::Boundary(got)) => assert_eq!(got, expected.as_slice()),
            other => panic!("unexpected message {other:?}"),
        }
        match rx.recv_into(&mut buf).await? {
            Msg::Control(cmd) => assert_eq!(cmd, Command::Barrier),
            other => panic!("unexpected message {other:?}"),
        }
        Ok::<_, std::io::Error>(())
    };

    let (sent, received) = tokio::join!(send, recv);
    sent.unwrap();
    received.unwrap();
}
