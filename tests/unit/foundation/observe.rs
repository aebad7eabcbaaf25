use super::*;

#[test]
fn snapshot_reflects_latest_set() {
    let obs = Observable::new(1u32);
    obs.set(2);
    obs.modify(|v| *v += 1);
    assert_eq!(obs.get(), 3);
    assert_eq!(obs.with(|v| *v * 2), 6);
}

#[test]
fn modify_if_only_notifies_on_change() {
    let obs = Observable::new(vec![1, 2, 3]);
    let mut rx = obs.subscribe();

    assert!(!obs.modify_if(|v| {
        let before = v.len();
        v.retain(|x| *x != 9);
        v.len() != before
    }));
    assert!(!rx.has_changed().unwrap());

    assert!(obs.modify_if(|v| {
        let before = v.len();
        v.retain(|x| *x != 2);
        v.len() != before
    }));
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), vec![1, 3]);
}

#[tokio::test]
async fn subscriber_sees_subsequent_values() {
    let obs = Observable::new(String::from("a"));
    let mut rx = obs.subscribe();
    obs.set("b".into());
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().as_str(), "b");
}

#[test]
fn hub_fans_out_and_prunes_closed_receivers() {
    let hub = EventHub::new();
    let mut a = hub.subscribe();
    let b = hub.subscribe();
    assert_eq!(hub.subscriber_count(), 2);

    drop(b);
    hub.emit(7u8);
    hub.emit(8u8);

    assert_eq!(hub.subscriber_count(), 1);
    assert_eq!(a.try_recv().unwrap(), 7);
    assert_eq!(a.try_recv().unwrap(), 8);
    assert!(a.try_recv().is_err());
}

#[test]
fn late_subscriber_misses_earlier_events() {
    let hub = EventHub::new();
    hub.emit(1i32);
    let mut rx = hub.subscribe();
    hub.emit(2);
    assert_eq!(rx.try_recv().unwrap(), 2);
}
