use chrono::TimeDelta;
use dispatch::{DecodeLayer, DispatchService, ElevatorSystem, RawRequest};
use tower::{Service, ServiceBuilder, ServiceExt};

fn service() -> DispatchService {
    DispatchService::new(ElevatorSystem::new(3, 10, TimeDelta::seconds(10)))
}

fn raw(json: &str) -> RawRequest {
    serde_json::from_str(json).unwrap()
}

#[tokio::test]
async fn answers_with_state_after_request() {
    let mut svc = service();
    let snapshot = svc
        .ready()
        .await
        .unwrap()
        .call(raw(
            r#"{"timestamp": "2022-05-13 08:00:00",
                "call": {"floor": 2, "sense": "upward", "call_type": "out"},
                "state": {"0": 5, "1": 3, "2": 10}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(snapshot.queued_floors(1), vec![2]);
    assert_eq!(snapshot.to_string(), "0: []\n1: [2]\n2: []\n");
}

#[tokio::test]
async fn rejection_is_an_error_and_state_is_kept() {
    let mut svc = service();
    let shared = svc.system();
    let result = svc
        .ready()
        .await
        .unwrap()
        .call(raw(
            r#"{"timestamp": "2022-05-13 08:00:00", "state": {"0": 5, "1": 3}}"#,
        ))
        .await;

    assert!(result.is_err());
    let system = shared.lock().await;
    assert!(system.elevators().all(|e| e.position() == 1));
}

#[tokio::test]
async fn clones_share_one_system() {
    let mut first = service();
    let mut second = first.clone();

    first
        .ready()
        .await
        .unwrap()
        .call(raw(
            r#"{"timestamp": "2022-05-13 08:00:00",
                "call": {"floor": 7, "sense": "downward", "call_type": "out"},
                "state": {"0": 2, "1": 9, "2": 1}}"#,
        ))
        .await
        .unwrap();
    let snapshot = second
        .ready()
        .await
        .unwrap()
        .call(raw(
            r#"{"timestamp": "2022-05-13 08:00:01", "state": {"0": 2, "1": 8, "2": 1}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(snapshot.queued_floors(1), vec![7]);
    assert_eq!(snapshot.elevator(1).map(|e| e.floor), Some(8));
}

#[tokio::test]
async fn decodes_datagrams() {
    let mut svc = ServiceBuilder::new().layer(DecodeLayer).service(service());

    let datagram: &[u8] = br#"{"timestamp": "2022-05-13 08:00:00",
        "call": {"floor": 4, "sense": "upward", "call_type": "in", "elevator_id": 2},
        "state": {"0": 1, "1": 1, "2": 1}}"#;
    svc.ready().await.unwrap();
    let snapshot = svc.call(datagram).await.unwrap();
    assert_eq!(snapshot.queued_floors(2), vec![4]);

    svc.ready().await.unwrap();
    assert!(svc.call(b"not json".as_slice()).await.is_err());

    let unknown_sense: &[u8] = br#"{"timestamp": "2022-05-13 08:00:00",
        "call": {"floor": 4, "sense": "sideways", "call_type": "out"},
        "state": {"0": 1, "1": 1, "2": 1}}"#;
    svc.ready().await.unwrap();
    assert!(svc.call(unknown_sense).await.is_err());
}
