//! Property tests for the bounded min-heap and the alarm registry.

#![allow(missing_docs)]

use proptest::prelude::*;
use wakedesk::{AlarmRegistry, Deadline, HeapError, MinHeap};

#[derive(Debug, Clone)]
enum Op {
    Insert(u16),
    Extract,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u16>().prop_map(Op::Insert),
        2 => Just(Op::Extract),
    ]
}

proptest! {
    #[test]
    fn extraction_is_sorted(mut values in prop::collection::vec(any::<u32>(), 0..64)) {
        let mut heap = MinHeap::with_capacity(64);
        for &v in &values {
            heap.insert(v).unwrap();
            prop_assert!(heap.is_valid_heap());
        }
        values.sort_unstable();
        let mut drained = Vec::with_capacity(values.len());
        while let Ok(v) = heap.extract_min() {
            prop_assert!(heap.is_valid_heap());
            drained.push(v);
        }
        prop_assert_eq!(drained, values);
    }

    #[test]
    fn mixed_ops_match_a_sorted_model(
        capacity in 1_usize..16,
        ops in prop::collection::vec(op(), 0..128),
    ) {
        let mut heap = MinHeap::with_capacity(capacity);
        let mut model: Vec<u16> = Vec::new();
        for op in ops {
            match op {
                Op::Insert(v) => {
                    let result = heap.insert(v);
                    if model.len() < capacity {
                        prop_assert!(result.is_ok());
                        model.push(v);
                    } else {
                        prop_assert_eq!(result, Err(HeapError::CapacityExceeded { capacity }));
                    }
                }
                Op::Extract => {
                    model.sort_unstable();
                    if model.is_empty() {
                        prop_assert_eq!(heap.extract_min(), Err(HeapError::EmptyHeap));
                    } else {
                        prop_assert_eq!(heap.extract_min(), Ok(model.remove(0)));
                    }
                }
            }
            prop_assert!(heap.is_valid_heap());
            prop_assert_eq!(heap.len(), model.len());
            prop_assert!(heap.len() <= heap.capacity());
            if let Some(min) = model.iter().min() {
                prop_assert_eq!(heap.peek_min(), Ok(min));
            }
        }
    }

    #[test]
    fn registry_counters_track_the_heap(
        capacity in 1_usize..8,
        secs in prop::collection::vec(0_u64..1_000, 0..24),
    ) {
        let mut registry = AlarmRegistry::new(capacity);
        let mut accepted = 0_usize;
        for s in &secs {
            if registry.register(Deadline::from_unix_secs(*s)).is_ok() {
                accepted += 1;
            }
            prop_assert!(registry.is_consistent());
        }
        prop_assert_eq!(accepted, secs.len().min(capacity));

        let mut previous = Deadline::EPOCH;
        let mut consumed = 0_usize;
        while let Ok(next) = registry.consume_earliest() {
            prop_assert!(next >= previous);
            previous = next;
            consumed += 1;
            prop_assert!(registry.is_consistent());
            prop_assert_eq!(registry.counts().expired, consumed);
        }
        prop_assert_eq!(consumed, accepted);
        prop_assert_eq!(registry.counts().pending, 0);
    }
}

#[test]
fn parent_and_children_of_every_position() {
    let mut heap = MinHeap::with_capacity(10);
    for v in 0..10_u8 {
        heap.insert(v).unwrap();
    }
    for i in 1..=heap.len() {
        if i == 1 {
            assert_eq!(heap.parent(i), None);
        } else {
            assert_eq!(heap.parent(i), Some(i / 2));
        }
        assert_eq!(heap.left(i), (2 * i <= 10).then_some(2 * i));
        assert_eq!(heap.right(i), (2 * i + 1 <= 10).then_some(2 * i + 1));
    }
}
