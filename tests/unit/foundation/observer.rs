use super::*;

#[test]
fn delivers_in_subscription_order() {
    let subject = Subject::<&'static str, u32>::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    for tag in ["a", "b", "c"] {
        let seen = Rc::clone(&seen);
        subject.on("tick", move |v: &u32| seen.borrow_mut().push(format!("{tag}{v}")));
    }
    let other = Rc::clone(&seen);
    subject.on("other", move |_| other.borrow_mut().push("x".to_string()));

    assert_eq!(subject.emit(&"tick", &1), 3);
    assert_eq!(*seen.borrow(), vec!["a1", "b1", "c1"]);
}

#[test]
fn off_is_idempotent_and_never_hits_newer_listeners() {
    let subject = Subject::<u8, ()>::new();
    let hits = Rc::new(Cell::new(0));

    let first = subject.on(0, |_| {});
    assert!(subject.off(first));
    assert!(!subject.off(first));

    let h = Rc::clone(&hits);
    subject.on(0, move |_| h.set(h.get() + 1));
    assert!(!subject.off(first));
    subject.emit(&0, &());
    assert_eq!(hits.get(), 1);
    assert_eq!(subject.len(), 1);
}

#[test]
fn listeners_may_unsubscribe_during_emit() {
    let subject = Rc::new(Subject::<u8, ()>::new());
    let id_cell = Rc::new(Cell::new(None));
    let hits = Rc::new(Cell::new(0));

    let s = Rc::clone(&subject);
    let ids = Rc::clone(&id_cell);
    let h = Rc::clone(&hits);
    let id = subject.on(1, move |_| {
        h.set(h.get() + 1);
        if let Some(id) = ids.get() {
            s.off(id);
        }
    });
    id_cell.set(Some(id));

    subject.emit(&1, &());
    subject.emit(&1, &());
    assert_eq!(hits.get(), 1);
    assert!(subject.is_empty());
}

#[test]
fn off_key_removes_only_that_key() {
    let subject = Subject::<String, ()>::new();
    subject.on("a".to_string(), |_| {});
    subject.on("a".to_string(), |_| {});
    subject.on("b".to_string(), |_| {});

    assert_eq!(subject.off_key(&"a".to_string()), 2);
    assert_eq!(subject.listener_count(&"a".to_string()), 0);
    assert_eq!(subject.listener_count(&"b".to_string()), 1);
    assert_eq!(subject.len(), 1);
}
