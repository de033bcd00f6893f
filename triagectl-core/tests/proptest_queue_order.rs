use proptest::prelude::*;
use triagectl_core::{NewPatient, PatientStore, Queue, Status};

proptest! {
    /// Property: waiting records come back by severity descending, ties in insertion order
    #[test]
    fn prop_waiting_ordered_by_severity_then_arrival(severities in prop::collection::vec(1i64..=5, 0..40)) {
        let store = PatientStore::open_in_memory().unwrap();

        let mut inserted = Vec::new();
        for (i, &severity) in severities.iter().enumerate() {
            let id = store
                .insert(&NewPatient::new(format!("patient-{i}"), 30, severity, ""))
                .unwrap();
            inserted.push((severity, id));
        }

        // Expected: stable sort by severity descending keeps arrival order within ties
        let mut expected = inserted.clone();
        expected.sort_by(|a, b| b.0.cmp(&a.0));

        let actual: Vec<_> = store
            .load_waiting()
            .unwrap()
            .into_iter()
            .map(|r| (r.severity, r.id))
            .collect();

        prop_assert_eq!(actual, expected);
    }

    /// Property: a served record leaves the queue and stays in history
    #[test]
    fn prop_served_records_move_to_history(
        severities in prop::collection::vec(1i64..=5, 1..20),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut queue = Queue::new(PatientStore::open_in_memory().unwrap(), 7);
        let ids: Vec<_> = severities
            .iter()
            .map(|&s| queue.admit(NewPatient::new("walk-in", 20, s, "")).unwrap())
            .collect();

        let target = ids[pick.index(ids.len())];
        prop_assert!(queue.serve(target).unwrap());

        prop_assert!(queue.waiting().unwrap().iter().all(|r| r.id != target));

        let history = queue.history(None).unwrap();
        prop_assert_eq!(history.len(), ids.len());
        let served = history.iter().find(|r| r.id == target).unwrap();
        prop_assert_eq!(served.status, Status::Served);
    }

    /// Property: history never exceeds its limit
    #[test]
    fn prop_history_respects_limit(count in 0usize..15, limit in 1usize..10) {
        let store = PatientStore::open_in_memory().unwrap();
        for i in 0..count {
            store.insert(&NewPatient::new(format!("p{i}"), 1, 1, "")).unwrap();
        }

        let history = store.load_history(Some(limit)).unwrap();
        prop_assert_eq!(history.len(), count.min(limit));
    }
}
